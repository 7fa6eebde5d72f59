use serde::{Deserialize, Serialize};

use crate::{
    model::{id::OperationModeId, range::NumberRange},
    quantity::{CostRate, FillLevel, FillRate, Watts},
};

/// Discrete way of operating the actuator (e.g. `charge.on`).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OperationMode {
    pub id: OperationModeId,

    #[serde(default)]
    pub diagnostic_label: Option<String>,

    /// At least one element; the elements' fill-level ranges partition the storage range.
    pub elements: Vec<OperationModeElement>,

    /// Only usable for fault recovery.
    #[serde(default)]
    pub abnormal_condition_only: bool,
}

/// Behaviour of an operation mode within one fill-level band.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OperationModeElement {
    pub fill_level_range: NumberRange<FillLevel>,
    pub fill_rate: NumberRange<FillRate>,
    pub power_ranges: Vec<PowerRange>,

    /// Money per second while the mode runs within this element.
    #[serde(default)]
    pub running_costs: Option<CostRate>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PowerRange {
    pub range: NumberRange<Watts>,
    pub commodity_quantity: CommodityQuantity,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommodityQuantity {
    ElectricPowerL1,
    ElectricPowerL2,
    ElectricPowerL3,
    ElectricPower3PhaseSymmetric,
    NaturalGasFlowRate,
    HydrogenFlowRate,
    HeatTemperature,
    HeatFlowRate,
    HeatThermalPower,
    OilFlowRate,
}

impl CommodityQuantity {
    /// Electric quantities sum into the actuator's expected power draw.
    #[must_use]
    pub const fn is_electric(self) -> bool {
        matches!(
            self,
            Self::ElectricPowerL1
                | Self::ElectricPowerL2
                | Self::ElectricPowerL3
                | Self::ElectricPower3PhaseSymmetric
        )
    }
}

impl OperationMode {
    /// Element whose fill-level range holds `fill_level`.
    ///
    /// When the level sits outside every element (numerical drift at the storage bounds),
    /// falls back to the nearest edge element rather than failing.
    #[must_use]
    pub fn element_at(&self, fill_level: FillLevel) -> &OperationModeElement {
        self.elements
            .iter()
            .find(|element| element.fill_level_range.contains(fill_level))
            .unwrap_or_else(|| {
                let first = self.elements.first().expect("a mode has at least one element");
                if fill_level < first.fill_level_range.min {
                    first
                } else {
                    self.elements.last().expect("a mode has at least one element")
                }
            })
    }

    /// Fill rate at the given level, interpolating the element's range by `factor` ∈ `[0, 1]`.
    pub fn fill_rate_at(&self, fill_level: FillLevel, factor: f64) -> FillRate {
        self.element_at(fill_level).fill_rate.at_factor(factor)
    }

    /// Total electric power at the given level and factor.
    pub fn power_at(&self, fill_level: FillLevel, factor: f64) -> Watts {
        self.element_at(fill_level)
            .power_ranges
            .iter()
            .filter(|power_range| power_range.commodity_quantity.is_electric())
            .map(|power_range| power_range.range.at_factor(factor))
            .sum()
    }

    /// Whether the factor actually changes anything, i.e. some range is non-degenerate.
    #[must_use]
    pub fn uses_factor(&self) -> bool {
        self.elements.iter().any(|element| element.fill_rate.min != element.fill_rate.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(
        range: NumberRange<FillLevel>,
        fill_rate: NumberRange<FillRate>,
    ) -> OperationModeElement {
        OperationModeElement {
            fill_level_range: range,
            fill_rate,
            power_ranges: vec![PowerRange {
                range: NumberRange::fixed(Watts(1_000.0)),
                commodity_quantity: CommodityQuantity::ElectricPowerL1,
            }],
            running_costs: None,
        }
    }

    fn two_element_mode() -> OperationMode {
        OperationMode {
            id: OperationModeId::from("mode"),
            diagnostic_label: None,
            elements: vec![
                element(
                    NumberRange::new(FillLevel(0.0), FillLevel(50.0)),
                    NumberRange::fixed(FillRate(2.0)),
                ),
                element(
                    NumberRange::new(FillLevel(50.0), FillLevel(100.0)),
                    NumberRange::fixed(FillRate(1.0)),
                ),
            ],
            abnormal_condition_only: false,
        }
    }

    #[test]
    fn element_selected_by_fill_level() {
        let mode = two_element_mode();
        assert_eq!(mode.fill_rate_at(FillLevel(25.0), 0.0), FillRate(2.0));
        assert_eq!(mode.fill_rate_at(FillLevel(75.0), 0.0), FillRate(1.0));
    }

    #[test]
    fn out_of_band_level_falls_back_to_edge_element() {
        let mode = two_element_mode();
        assert_eq!(mode.fill_rate_at(FillLevel(-1.0), 0.0), FillRate(2.0));
        assert_eq!(mode.fill_rate_at(FillLevel(101.0), 0.0), FillRate(1.0));
    }

    #[test]
    fn power_sums_electric_ranges_only() {
        let mut mode = two_element_mode();
        mode.elements[0].power_ranges.push(PowerRange {
            range: NumberRange::fixed(Watts(500.0)),
            commodity_quantity: CommodityQuantity::HeatThermalPower,
        });
        assert_eq!(mode.power_at(FillLevel(10.0), 0.0), Watts(1_000.0));
    }
}
