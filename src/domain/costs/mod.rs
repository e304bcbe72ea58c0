//! Costs module - cost lines, allocation against revenue, and break-even rates.

mod allocation;
mod items;
mod selective;

pub use allocation::{allocate_costs, CostSummary, NightBasis, VariableCostLine};
pub use items::{CostBook, FixedCost, VariableCost, VariableCostKind, VariableKindTag};
pub use selective::{analyze_apartment, ApartmentBottomRate, ApartmentCostProfile};
