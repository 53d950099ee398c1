//! Idle-game economy: balance, yield parameters and the upgrade shop.

use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{error::PurchaseError, storage::Storage};

const KEY_BALANCE: &str = "Coins";
const KEY_BASE: &str = "GetCoinsValue";
const KEY_MULTIPLIER: &str = "GetCoinsMulti";

/// Bonus added on top of one earn by the "mod menu" novelty item.
const MOD_MENU_BONUS: f64 = 2.35 * 4.0;

/// Balance plus the two parameters that scale each earn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomyState {
    /// Spendable coins, never negative.
    pub balance: f64,
    /// Coins per earn before the multiplier, at least 1.
    pub yield_base: f64,
    /// Multiplier applied to each earn, at least 1.
    pub yield_multiplier: f64,
}

impl Default for EconomyState {
    fn default() -> Self {
        Self {
            balance: 0.0,
            yield_base: 1.0,
            yield_multiplier: 1.0,
        }
    }
}

impl EconomyState {
    /// Coins granted by a single earn.
    pub fn earn_delta(&self) -> f64 {
        self.yield_base * self.yield_multiplier
    }

    fn is_valid(&self) -> bool {
        self.balance.is_finite()
            && self.yield_base.is_finite()
            && self.yield_multiplier.is_finite()
            && self.balance >= 0.0
            && self.yield_base >= 1.0
            && self.yield_multiplier >= 1.0
    }

    /// Encode as the `key:value` per line record used on disk.
    pub fn serialize(&self) -> String {
        format!(
            "{KEY_BALANCE}:{}\n{KEY_BASE}:{}\n{KEY_MULTIPLIER}:{}",
            self.balance, self.yield_base, self.yield_multiplier
        )
    }

    /// Decode a record, substituting defaults for anything missing or corrupt.
    pub fn deserialize(content: &str) -> Self {
        match Self::parse(content) {
            Some(state) if state.is_valid() => state,
            _ => {
                warn!("economy record malformed; using defaults");
                Self::default()
            }
        }
    }

    fn parse(content: &str) -> Option<Self> {
        let fields: HashMap<&str, &str> = content
            .lines()
            .filter_map(|line| line.trim().split_once(':'))
            .map(|(key, value)| (key.trim(), value.trim()))
            .collect();
        Some(Self {
            balance: fields.get(KEY_BALANCE)?.parse().ok()?,
            yield_base: fields.get(KEY_BASE)?.parse().ok()?,
            yield_multiplier: fields.get(KEY_MULTIPLIER)?.parse().ok()?,
        })
    }
}

/// What an upgrade does once bought.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Raise the multiplier by the given amount.
    Multiplier(f64),
    /// Raise the base yield by the given amount.
    Base(f64),
    /// Raise both base and multiplier.
    BaseAndMultiplier(f64, f64),
    /// Grants a product key; the economy itself is unchanged.
    ProductKey,
}

impl Effect {
    fn apply(self, state: &mut EconomyState) {
        match self {
            Effect::Multiplier(amount) => state.yield_multiplier += amount,
            Effect::Base(amount) => state.yield_base += amount,
            Effect::BaseAndMultiplier(base, multiplier) => {
                state.yield_base += base;
                state.yield_multiplier += multiplier;
            }
            Effect::ProductKey => {}
        }
    }
}

/// One purchasable shop entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Upgrade {
    /// Identifier typed after `buy`.
    pub id: &'static str,
    /// Alternative identifiers.
    pub aliases: &'static [&'static str],
    /// Cost in coins.
    pub price: f64,
    /// Shop listing text.
    pub label: &'static str,
    /// Change applied on purchase.
    pub effect: Effect,
}

/// Fixed, ordered price table.
#[derive(Debug, Clone)]
pub struct UpgradeCatalog {
    upgrades: Vec<Upgrade>,
}

impl Default for UpgradeCatalog {
    fn default() -> Self {
        Self::new(vec![
            Upgrade {
                id: "1",
                aliases: &["mult1"],
                price: 25.0,
                label: "+1.03x coin multiplier",
                effect: Effect::Multiplier(1.03),
            },
            Upgrade {
                id: "2",
                aliases: &["mult2"],
                price: 230.0,
                label: "+1.18x coin multiplier",
                effect: Effect::Multiplier(1.18),
            },
            Upgrade {
                id: "3",
                aliases: &["base1"],
                price: 450.0,
                label: "+4 Coins Addition",
                effect: Effect::Base(4.0),
            },
            Upgrade {
                id: "4",
                aliases: &["combo1"],
                price: 800.0,
                label: "+12 Coins Addition with +1.4x coin multiplier",
                effect: Effect::BaseAndMultiplier(12.0, 1.4),
            },
            Upgrade {
                id: "5",
                aliases: &["mult3"],
                price: 4000.0,
                label: "+2x Coin Multiplier",
                effect: Effect::Multiplier(2.0),
            },
            Upgrade {
                id: "6",
                aliases: &["key"],
                price: 20000.0,
                label: "Product Key",
                effect: Effect::ProductKey,
            },
        ])
    }
}

impl UpgradeCatalog {
    /// Build a catalog from an explicit list.
    pub fn new(upgrades: Vec<Upgrade>) -> Self {
        Self { upgrades }
    }

    /// Look up by id or alias.
    pub fn get(&self, id: &str) -> Option<&Upgrade> {
        let id = id.trim();
        self.upgrades
            .iter()
            .find(|upgrade| upgrade.id == id || upgrade.aliases.contains(&id))
    }

    /// Entries in shop order.
    pub fn iter(&self) -> impl Iterator<Item = &Upgrade> {
        self.upgrades.iter()
    }

    /// Shop page lines, one per upgrade.
    pub fn listing(&self) -> Vec<String> {
        self.upgrades
            .iter()
            .map(|upgrade| {
                format!(
                    "{} - {} coins (ID: {})",
                    upgrade.label,
                    format_amount(upgrade.price),
                    upgrade.id
                )
            })
            .collect()
    }
}

/// Economy state bound to its catalog.
#[derive(Debug, Clone, Default)]
pub struct EconomyEngine {
    state: EconomyState,
    catalog: UpgradeCatalog,
}

impl EconomyEngine {
    /// Fresh `{0, 1, 1}` economy with the built-in catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine starting from an explicit state.
    pub fn with_state(state: EconomyState) -> Self {
        Self {
            state,
            catalog: UpgradeCatalog::default(),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> EconomyState {
        self.state
    }

    /// Current balance.
    pub fn balance(&self) -> f64 {
        self.state.balance
    }

    /// The shop catalog.
    pub fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    /// Credit one earn and return the amount credited.
    pub fn earn(&mut self) -> f64 {
        let delta = self.state.earn_delta();
        self.state.balance += delta;
        delta
    }

    /// Check affordability without buying.
    pub fn quote(&self, id: &str) -> Result<&Upgrade, PurchaseError> {
        let upgrade = self
            .catalog
            .get(id)
            .ok_or_else(|| PurchaseError::UnknownUpgrade(id.trim().to_string()))?;
        // Strictly greater: an exact balance is not enough.
        if self.state.balance > upgrade.price {
            Ok(upgrade)
        } else {
            Err(PurchaseError::InsufficientFunds {
                price: upgrade.price,
                balance: self.state.balance,
            })
        }
    }

    /// Buy an upgrade, debiting its price and applying its effect.
    pub fn purchase(&mut self, id: &str) -> Result<Upgrade, PurchaseError> {
        let upgrade = self.quote(id)?.clone();
        self.state.balance -= upgrade.price;
        upgrade.effect.apply(&mut self.state);
        info!(
            id = upgrade.id,
            price = upgrade.price,
            balance = self.state.balance,
            "upgrade purchased"
        );
        Ok(upgrade)
    }

    /// Novelty "mod menu": one earn plus a fixed bonus, no price check.
    pub fn mod_menu_bonus(&mut self) -> f64 {
        let delta = self.state.earn_delta() + MOD_MENU_BONUS;
        self.state.balance += delta;
        delta
    }

    /// `You have <n> Coins.`
    pub fn balance_report(&self) -> String {
        format!("You have {} Coins.", format_amount(self.state.balance))
    }

    /// Encode the current state.
    pub fn serialize(&self) -> String {
        self.state.serialize()
    }

    /// Replace the current state from a record, falling back to defaults.
    pub fn deserialize(&mut self, content: &str) {
        self.state = EconomyState::deserialize(content);
    }

    /// Write the state record to `path`.
    pub fn save(&self, storage: &dyn Storage, path: &str) -> Result<()> {
        storage.write_file(path, &self.serialize())?;
        info!(path, balance = self.state.balance, "economy saved");
        Ok(())
    }

    /// Restore from `path`; unreadable or missing data yields defaults.
    pub fn load(&mut self, storage: &dyn Storage, path: &str) {
        self.state = match storage.read_file(path) {
            Ok(Some(content)) => EconomyState::deserialize(&content),
            Ok(None) => {
                warn!(path, "no economy record; using defaults");
                EconomyState::default()
            }
            Err(err) => {
                warn!(path, ?err, "economy record unreadable; using defaults");
                EconomyState::default()
            }
        };
        info!(path, balance = self.state.balance, "economy loaded");
    }
}

/// Human-facing number: integers without decimals, otherwise up to two.
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        let text = format!("{rounded:.2}");
        text.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn earn_uses_base_times_multiplier() {
        let mut engine = EconomyEngine::with_state(EconomyState {
            balance: 0.0,
            yield_base: 5.0,
            yield_multiplier: 2.0,
        });
        assert_eq!(engine.earn(), 10.0);
        assert_eq!(engine.balance(), 10.0);
    }

    #[test]
    fn purchase_requires_strictly_more_than_price() {
        let mut engine = EconomyEngine::new();
        assert_eq!(engine.earn(), 1.0);
        assert!(matches!(
            engine.purchase("mult1"),
            Err(PurchaseError::InsufficientFunds { .. })
        ));
        for _ in 0..9 {
            engine.earn();
        }
        assert_eq!(engine.balance(), 10.0);
        assert!(engine.purchase("mult1").is_err());

        while engine.balance() < 25.0 {
            engine.earn();
        }
        assert_eq!(engine.balance(), 25.0);
        let before = engine.state();
        assert!(engine.purchase("mult1").is_err());
        assert_eq!(engine.state(), before);

        engine.earn();
        let upgrade = engine.purchase("mult1").expect("affordable");
        assert_eq!(upgrade.id, "1");
        assert_eq!(engine.balance(), 1.0);
        assert!((engine.state().yield_multiplier - 2.03).abs() < 1e-9);
    }

    #[test]
    fn balance_never_negative_over_purchase_sequences() {
        let mut engine = EconomyEngine::new();
        let ids = ["1", "2", "3", "4", "5", "6", "mult1"];
        for round in 0..2_000 {
            engine.earn();
            let id = ids[round % ids.len()];
            let before = engine.state();
            match engine.purchase(id) {
                Ok(upgrade) => assert!(before.balance > upgrade.price),
                Err(_) => assert_eq!(engine.state(), before),
            }
            assert!(engine.balance() >= 0.0);
        }
    }

    #[test]
    fn unknown_upgrade_is_reported() {
        let mut engine = EconomyEngine::new();
        assert_eq!(
            engine.purchase("99"),
            Err(PurchaseError::UnknownUpgrade("99".to_string()))
        );
    }

    #[test]
    fn effects_follow_catalog() {
        let mut engine = EconomyEngine::with_state(EconomyState {
            balance: 1_000.0,
            ..EconomyState::default()
        });
        engine.purchase("4").expect("affordable");
        let state = engine.state();
        assert_eq!(state.balance, 200.0);
        assert_eq!(state.yield_base, 13.0);
        assert!((state.yield_multiplier - 2.4).abs() < 1e-9);
    }

    #[test]
    fn serialize_round_trip_is_exact() {
        let state = EconomyState {
            balance: 1234.5678901,
            yield_base: 17.0,
            yield_multiplier: 1.0 + 1.03 + 1.18,
        };
        assert_eq!(EconomyState::deserialize(&state.serialize()), state);
    }

    #[test]
    fn record_format_matches_disk_layout() {
        let state = EconomyState {
            balance: 3.5,
            yield_base: 1.0,
            yield_multiplier: 2.0,
        };
        assert_eq!(state.serialize(), "Coins:3.5\nGetCoinsValue:1\nGetCoinsMulti:2");
    }

    #[test]
    fn malformed_records_fall_back_to_defaults() {
        for content in [
            "",
            "garbage",
            "Coins:abc\nGetCoinsValue:1\nGetCoinsMulti:1",
            "Coins:5\nGetCoinsValue:1",
            "Coins:-5\nGetCoinsValue:1\nGetCoinsMulti:1",
            "Coins:5\nGetCoinsValue:0\nGetCoinsMulti:1",
            "Coins:NaN\nGetCoinsValue:1\nGetCoinsMulti:1",
        ] {
            assert_eq!(EconomyState::deserialize(content), EconomyState::default());
        }
    }

    #[test]
    fn windows_line_endings_are_accepted() {
        let state = EconomyState::deserialize("Coins:7\r\nGetCoinsValue:2\r\nGetCoinsMulti:3\r\n");
        assert_eq!(state.balance, 7.0);
        assert_eq!(state.yield_multiplier, 3.0);
    }

    #[test]
    fn save_and_load_through_storage() -> Result<()> {
        let storage = MemoryStorage::new();
        let mut engine = EconomyEngine::new();
        engine.earn();
        engine.earn();
        engine.save(&storage, "game1data.txt")?;

        let mut restored = EconomyEngine::new();
        restored.load(&storage, "game1data.txt");
        assert_eq!(restored.state(), engine.state());

        let mut missing = EconomyEngine::with_state(EconomyState {
            balance: 99.0,
            ..EconomyState::default()
        });
        missing.load(&storage, "other.txt");
        assert_eq!(missing.state(), EconomyState::default());
        Ok(())
    }

    #[test]
    fn mod_menu_adds_bonus_without_price() {
        let mut engine = EconomyEngine::new();
        let delta = engine.mod_menu_bonus();
        assert!((delta - 10.4).abs() < 1e-9);
        assert!((engine.balance() - 10.4).abs() < 1e-9);
    }

    #[test]
    fn amounts_format_like_a_shop_display() {
        assert_eq!(format_amount(1.0), "1");
        assert_eq!(format_amount(2.03), "2.03");
        assert_eq!(format_amount(1.0 + 1.03), "2.03");
        assert_eq!(format_amount(10.4), "10.4");
        assert_eq!(format_amount(20000.0), "20000");
    }

    #[test]
    fn listing_mentions_every_id() {
        let catalog = UpgradeCatalog::default();
        let lines = catalog.listing();
        assert_eq!(lines.len(), catalog.iter().count());
        assert_eq!(lines[0], "+1.03x coin multiplier - 25 coins (ID: 1)");
    }
}
