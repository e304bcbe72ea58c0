//! Fixed and variable cost items and the book that holds them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    finite_or_zero, CostItemId, DomainError, ErrorCode, Month, MonthlySeries, ValidationError,
};

/// Cost spread evenly across the year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedCost {
    pub id: CostItemId,
    pub name: String,
    pub annual_amount: f64,
}

impl FixedCost {
    pub fn new(name: impl Into<String>, annual_amount: f64) -> Self {
        Self {
            id: CostItemId::new(),
            name: name.into(),
            annual_amount: finite_or_zero(annual_amount),
        }
    }

    /// One twelfth of the annual amount.
    pub fn monthly_amount(&self) -> f64 {
        finite_or_zero(self.annual_amount) / 12.0
    }
}

/// How a variable cost is driven.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariableCostKind {
    /// `rate` percent of each month's revenue.
    PercentageOfRevenue { rate: f64 },
    /// Independent monthly amounts; the annual total is their sum.
    Absolute { monthly: MonthlySeries },
}

/// Discriminant used when switching an item to another kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKindTag {
    Percentage,
    Absolute,
}

impl VariableCostKind {
    pub fn tag(&self) -> VariableKindTag {
        match self {
            VariableCostKind::PercentageOfRevenue { .. } => VariableKindTag::Percentage,
            VariableCostKind::Absolute { .. } => VariableKindTag::Absolute,
        }
    }

    fn empty(tag: VariableKindTag) -> Self {
        match tag {
            VariableKindTag::Percentage => VariableCostKind::PercentageOfRevenue { rate: 0.0 },
            VariableKindTag::Absolute => VariableCostKind::Absolute {
                monthly: MonthlySeries::zeros(),
            },
        }
    }
}

/// Cost that moves with revenue or is entered month by month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCost {
    pub id: CostItemId,
    pub name: String,
    #[serde(flatten)]
    pub kind: VariableCostKind,
}

impl VariableCost {
    pub fn percentage(name: impl Into<String>, rate: f64) -> Self {
        Self {
            id: CostItemId::new(),
            name: name.into(),
            kind: VariableCostKind::PercentageOfRevenue {
                rate: finite_or_zero(rate),
            },
        }
    }

    pub fn absolute(name: impl Into<String>, monthly: MonthlySeries) -> Self {
        Self {
            id: CostItemId::new(),
            name: name.into(),
            kind: VariableCostKind::Absolute {
                monthly: monthly.sanitized(),
            },
        }
    }

    /// Monthly cost given the revenue it applies to.
    pub fn monthly_cost(&self, revenue: &MonthlySeries) -> MonthlySeries {
        match &self.kind {
            VariableCostKind::PercentageOfRevenue { rate } => {
                let rate = finite_or_zero(*rate);
                revenue.map(|r| finite_or_zero(r) * rate / 100.0)
            }
            VariableCostKind::Absolute { monthly } => monthly.sanitized(),
        }
    }
}

/// Every cost line the operator maintains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBook {
    pub fixed: Vec<FixedCost>,
    pub variable: Vec<VariableCost>,
}

impl Default for CostBook {
    /// Rent, OTA commissions and utilities.
    fn default() -> Self {
        Self {
            fixed: vec![FixedCost::new("Rent", 24_000.0)],
            variable: vec![
                VariableCost::percentage("OTA commissions", 15.0),
                VariableCost::absolute(
                    "Utilities",
                    MonthlySeries::from_values([
                        200.0, 220.0, 250.0, 300.0, 350.0, 400.0, 450.0, 400.0, 300.0, 250.0,
                        220.0, 210.0,
                    ]),
                ),
            ],
        }
    }
}

impl CostBook {
    pub fn empty() -> Self {
        Self {
            fixed: Vec::new(),
            variable: Vec::new(),
        }
    }

    pub fn add_fixed(&mut self, name: impl Into<String>, annual_amount: f64) -> CostItemId {
        let item = FixedCost::new(name, annual_amount);
        let id = item.id;
        self.fixed.push(item);
        id
    }

    pub fn add_variable(&mut self, name: impl Into<String>, tag: VariableKindTag) -> CostItemId {
        let item = VariableCost {
            id: CostItemId::new(),
            name: name.into(),
            kind: VariableCostKind::empty(tag),
        };
        let id = item.id;
        self.variable.push(item);
        id
    }

    /// Removes a fixed or variable item.
    pub fn remove(&mut self, id: CostItemId) -> Result<(), DomainError> {
        let before = self.fixed.len() + self.variable.len();
        self.fixed.retain(|c| c.id != id);
        self.variable.retain(|c| c.id != id);
        if self.fixed.len() + self.variable.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    pub fn rename(&mut self, id: CostItemId, name: &str) -> Result<(), DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name").into());
        }
        if let Some(item) = self.fixed.iter_mut().find(|c| c.id == id) {
            item.name = name.to_string();
            return Ok(());
        }
        self.variable_mut(id)?.name = name.to_string();
        Ok(())
    }

    pub fn set_annual_amount(&mut self, id: CostItemId, amount: f64) -> Result<(), DomainError> {
        let item = self
            .fixed
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found(id))?;
        item.annual_amount = finite_or_zero(amount);
        Ok(())
    }

    /// Switches a variable item's kind. Its previous values are discarded.
    pub fn change_kind(&mut self, id: CostItemId, tag: VariableKindTag) -> Result<(), DomainError> {
        let item = self.variable_mut(id)?;
        if item.kind.tag() != tag {
            item.kind = VariableCostKind::empty(tag);
        }
        Ok(())
    }

    pub fn set_rate(&mut self, id: CostItemId, rate: f64) -> Result<(), DomainError> {
        match &mut self.variable_mut(id)?.kind {
            VariableCostKind::PercentageOfRevenue { rate: current } => {
                *current = finite_or_zero(rate);
                Ok(())
            }
            VariableCostKind::Absolute { .. } => Err(DomainError::validation(
                "rate",
                "Only percentage items carry a rate",
            )),
        }
    }

    pub fn set_monthly_value(
        &mut self,
        id: CostItemId,
        month: Month,
        value: f64,
    ) -> Result<(), DomainError> {
        match &mut self.variable_mut(id)?.kind {
            VariableCostKind::Absolute { monthly } => {
                monthly.set(month, finite_or_zero(value));
                Ok(())
            }
            VariableCostKind::PercentageOfRevenue { .. } => Err(DomainError::validation(
                "monthly",
                "Percentage items have no monthly values",
            )),
        }
    }

    fn variable_mut(&mut self, id: CostItemId) -> Result<&mut VariableCost, DomainError> {
        self.variable
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: CostItemId) -> DomainError {
    DomainError::new(ErrorCode::CostItemNotFound, "Cost item not found")
        .with_detail("id", id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_cost_spreads_evenly() {
        assert_eq!(FixedCost::new("Rent", 24_000.0).monthly_amount(), 2000.0);
    }

    #[test]
    fn percentage_cost_follows_revenue() {
        let item = VariableCost::percentage("OTA", 15.0);
        let mut revenue = MonthlySeries::zeros();
        revenue.set(Month::July, 10_000.0);
        let cost = item.monthly_cost(&revenue);
        assert_eq!(cost.get(Month::July), 1500.0);
        assert_eq!(cost.get(Month::June), 0.0);
    }

    #[test]
    fn default_utilities_total_is_recomputed() {
        let book = CostBook::default();
        let utilities = &book.variable[1];
        let total = utilities.monthly_cost(&MonthlySeries::zeros()).sum();
        assert_eq!(total, 3950.0);
    }

    #[test]
    fn change_kind_resets_values() {
        let mut book = CostBook::default();
        let id = book.variable[1].id;
        book.change_kind(id, VariableKindTag::Percentage).unwrap();
        assert_eq!(
            book.variable[1].kind,
            VariableCostKind::PercentageOfRevenue { rate: 0.0 }
        );
    }

    #[test]
    fn kind_specific_setters_reject_wrong_kind() {
        let mut book = CostBook::default();
        let ota = book.variable[0].id;
        let utilities = book.variable[1].id;

        assert!(book.set_monthly_value(ota, Month::May, 10.0).is_err());
        assert!(book.set_rate(utilities, 3.0).is_err());

        book.set_rate(ota, 18.0).unwrap();
        book.set_monthly_value(utilities, Month::May, 500.0).unwrap();
        assert_eq!(book.variable[0].kind, VariableCostKind::PercentageOfRevenue { rate: 18.0 });
    }

    #[test]
    fn remove_unknown_item_is_not_found() {
        let mut book = CostBook::default();
        let err = book.remove(CostItemId::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CostItemNotFound);

        let rent = book.fixed[0].id;
        book.remove(rent).unwrap();
        assert!(book.fixed.is_empty());
    }

    #[test]
    fn rename_requires_a_name() {
        let mut book = CostBook::default();
        let rent = book.fixed[0].id;
        assert_eq!(book.rename(rent, " ").unwrap_err().code, ErrorCode::EmptyField);
        book.rename(rent, "Lease").unwrap();
        assert_eq!(book.fixed[0].name, "Lease");
    }

    #[test]
    fn variable_cost_serializes_with_explicit_tag() {
        let item = VariableCost::percentage("OTA", 15.0);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "percentage_of_revenue");
        assert_eq!(json["rate"], 15.0);

        let back: VariableCost = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn malformed_variable_cost_is_rejected() {
        let raw = r#"{"id":"1b4e28ba-2fa1-11d2-883f-0016d3cca427","name":"x","type":"absolute","monthly":[1,2,3]}"#;
        assert!(serde_json::from_str::<VariableCost>(raw).is_err());
    }
}
