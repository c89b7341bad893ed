use super::config::CongressConfig;
use super::session::open_engine;
use super::SeedTarget;
use legislature::congress::{Amount, BodyId, Currency, UserId};
use tracing::info;

/// Write external state the engine only reads: citizenship, seats, funds
pub async fn execute(
    config: &CongressConfig,
    target: SeedTarget,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine(config).await?;
    let store = engine.store();

    match target {
        SeedTarget::Citizen { user, body } => {
            store.add_citizen(UserId(user), BodyId(body)).await?;
            info!(user, body, "citizen seeded");
            println!("{} is a citizen of {}", UserId(user), BodyId(body));
        }
        SeedTarget::Member { user, body } => {
            store.add_member(UserId(user), BodyId(body)).await?;
            info!(user, body, "member seeded");
            println!("{} holds a seat in {}", UserId(user), BodyId(body));
        }
        SeedTarget::Treasury {
            body,
            amount,
            currency,
        } => {
            let (amount, currency) = funds(config, &amount, &currency)?;
            store.set_treasury(BodyId(body), &currency, amount).await?;
            info!(body, %amount, %currency, "treasury seeded");
            println!("{} treasury: {} {}", BodyId(body), amount, currency);
        }
        SeedTarget::Wallet {
            user,
            amount,
            currency,
        } => {
            let (amount, currency) = funds(config, &amount, &currency)?;
            store.set_wallet(UserId(user), &currency, amount).await?;
            info!(user, %amount, %currency, "wallet seeded");
            println!("{} wallet: {} {}", UserId(user), amount, currency);
        }
    }
    Ok(())
}

fn funds(
    config: &CongressConfig,
    amount: &str,
    currency: &str,
) -> Result<(Amount, Currency), Box<dyn std::error::Error>> {
    let amount: Amount = amount.parse()?;
    let currency = Currency::new(currency);
    if !config.governance.accepts_currency(currency.as_str()) {
        return Err(format!("Unknown currency: {}", currency).into());
    }
    Ok((amount, currency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funds_validation() {
        let config = CongressConfig::default();

        let (amount, currency) = funds(&config, "12.5", "GOLD").unwrap();
        assert_eq!(amount, Amount::from_minor(1250));
        assert_eq!(currency.as_str(), "gold");

        assert!(funds(&config, "12.5", "silver").is_err());
        assert!(funds(&config, "-3", "gold").is_err());
    }
}
