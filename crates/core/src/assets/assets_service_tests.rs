use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::assets::{AssetServiceTrait, AssetType, AssetUpdate, NewAsset};
use crate::auth::Principal;
use crate::errors::Error;
use crate::investments::{InvestmentServiceTrait, NewInvestment};
use crate::settings::PlatformSettings;
use crate::test_support::Platform;

fn admin() -> Principal {
    Principal::admin("admin")
}

fn silver() -> NewAsset {
    NewAsset {
        id: None,
        name: "Silver".to_string(),
        symbol: " xag ".to_string(),
        asset_type: AssetType::Silver,
        current_price: dec!(25.40),
        min_investment: dec!(50),
    }
}

#[tokio::test]
async fn test_create_asset_normalizes_symbol_and_seeds_history() {
    let p = Platform::new();

    let asset = p.assets.create_asset(&admin(), silver()).await.unwrap();
    assert_eq!(asset.symbol, "XAG");
    assert!(asset.is_active);
    assert_eq!(asset.price_history.len(), 1);
    assert_eq!(asset.price_history[0].price, dec!(25.40));

    let err = p.assets.create_asset(&admin(), silver()).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = p
        .assets
        .create_asset(&Principal::user("alice"), silver())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}

#[tokio::test]
async fn test_update_asset_fields() {
    let p = Platform::new();
    let asset = p.assets.create_asset(&admin(), silver()).await.unwrap();

    let updated = p
        .assets
        .update_asset(
            &admin(),
            &asset.id,
            AssetUpdate {
                name: Some("Silver Bullion".to_string()),
                min_investment: Some(dec!(75)),
                ..AssetUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Silver Bullion");
    assert_eq!(updated.min_investment, dec!(75));
    assert_eq!(updated.asset_type, AssetType::Silver);
    assert_eq!(updated.version, asset.version + 1);
    assert_eq!(updated.current_price, dec!(25.40));
}

#[tokio::test]
async fn test_price_update_rejects_non_positive_price() {
    let p = Platform::new();
    p.store.seed_asset("gold", dec!(2000), dec!(100));

    for price in [Decimal::ZERO, dec!(-1)] {
        let err = p
            .assets
            .update_price(&admin(), "gold", price)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
    assert_eq!(p.assets.get_asset("gold").unwrap().current_price, dec!(2000));
}

#[tokio::test]
async fn test_price_history_is_bounded() {
    let p = Platform::with_settings(PlatformSettings {
        price_history_limit: 3,
        ..PlatformSettings::default()
    });
    p.store.seed_asset("gold", dec!(2000), dec!(100));

    for price in [dec!(2001), dec!(2002), dec!(2003), dec!(2004)] {
        p.assets.update_price(&admin(), "gold", price).await.unwrap();
    }

    let asset = p.assets.get_asset("gold").unwrap();
    let prices: Vec<_> = asset.price_history.iter().map(|pt| pt.price).collect();
    assert_eq!(prices, vec![dec!(2002), dec!(2003), dec!(2004)]);
    assert_eq!(asset.current_price, dec!(2004));
}

#[tokio::test]
async fn test_price_update_on_inactive_asset_is_invalid() {
    let p = Platform::new();
    p.store.seed_asset("gold", dec!(2000), dec!(100));
    p.assets.deactivate_asset(&admin(), "gold").await.unwrap();

    let err = p
        .assets
        .update_price(&admin(), "gold", dec!(2100))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}

#[tokio::test]
async fn test_deactivate_requires_no_open_investments() {
    let p = Platform::new();
    p.store.seed_asset("gold", dec!(2000), dec!(100));
    p.store.seed_user("alice", Decimal::ZERO);
    let inv = p
        .investments
        .create_investment(
            &Principal::user("alice"),
            NewInvestment {
                user_id: "alice".to_string(),
                asset_id: "gold".to_string(),
                amount: dec!(500),
                deposit_method: "card".to_string(),
                deposit_proof: None,
            },
        )
        .await
        .unwrap();

    let err = p
        .assets
        .deactivate_asset(&admin(), "gold")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));

    p.investments
        .reject_investment(&admin(), &inv.id, None)
        .await
        .unwrap();
    let asset = p.assets.deactivate_asset(&admin(), "gold").await.unwrap();
    assert!(!asset.is_active);
    assert!(p.assets.list_assets(Some(true)).unwrap().is_empty());
    assert_eq!(p.assets.list_assets(None).unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_price_updates_do_not_interleave() {
    let p = Platform::new();
    p.store.seed_asset("gold", dec!(2000), dec!(100));
    p.store.seed_user("alice", Decimal::ZERO);
    let inv = p
        .investments
        .create_investment(
            &Principal::user("alice"),
            NewInvestment {
                user_id: "alice".to_string(),
                asset_id: "gold".to_string(),
                amount: dec!(1000),
                deposit_method: "card".to_string(),
                deposit_proof: None,
            },
        )
        .await
        .unwrap();
    p.investments
        .approve_investment(&admin(), &inv.id)
        .await
        .unwrap();

    let admin = admin();
    let (a, b) = tokio::join!(
        p.assets.update_price(&admin, "gold", dec!(2200)),
        p.assets.update_price(&admin, "gold", dec!(1800)),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    // Whatever the order, the balance tracks the final price exactly.
    let final_price = p.assets.get_asset("gold").unwrap().current_price;
    let expected = if final_price == dec!(2200) { dec!(100) } else { dec!(-100) };
    assert_eq!(p.store.balance_of("alice"), expected);
    assert_eq!(
        a.reconciliation.total_delta + b.reconciliation.total_delta,
        expected
    );
}
