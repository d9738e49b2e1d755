use serde::{Deserialize, Serialize};

pub const TRIGGER_YES: &str = "Yes";
pub const ROAD: &str = "Road";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToggleState {
    /// Initial state at load.
    HiddenDisabledEmpty,
    VisibleEnabled,
}

/// A Yes/No radio group controlling one dependent field group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalToggle {
    group: String,
    trigger: String,
    targets: Vec<String>,
    state: ToggleState,
}

impl ConditionalToggle {
    pub fn new(group: &str, trigger: &str, targets: &[&str]) -> Self {
        Self {
            group: group.to_string(),
            trigger: trigger.to_string(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
            state: ToggleState::HiddenDisabledEmpty,
        }
    }

    /// Moves to the state for the group's checked value and returns it.
    /// The caller clears the targets' values on `HiddenDisabledEmpty`.
    pub fn on_change(&mut self, checked_value: &str) -> ToggleState {
        self.state = if checked_value == self.trigger {
            ToggleState::VisibleEnabled
        } else {
            ToggleState::HiddenDisabledEmpty
        };
        tracing::debug!("Toggle '{}' -> {:?}", self.group, self.state);
        self.state
    }

    pub fn reset(&mut self) {
        self.state = ToggleState::HiddenDisabledEmpty;
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == ToggleState::VisibleEnabled
    }

    pub fn controls(&self, field: &str) -> bool {
        self.targets.iter().any(|t| t == field)
    }
}

/// Radio groups revealing a field when answered "Yes".
pub fn udcpr_toggles() -> Vec<ConditionalToggle> {
    vec![
        ConditionalToggle::new("incentive_fsi", TRIGGER_YES, &["incentive_fsi_rating"]),
        ConditionalToggle::new("electrical_line", TRIGGER_YES, &["electrical_line_voltage"]),
        ConditionalToggle::new("reservation_area_affected", TRIGGER_YES, &["reservation_area_sqm"]),
        ConditionalToggle::new("dp_rp_road_affected", TRIGGER_YES, &["dp_rp_road_area_sqm"]),
        ConditionalToggle::new("crz_status", TRIGGER_YES, &["crz_location"]),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Left,
    Right,
    Rear,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Front, Side::Left, Side::Right, Side::Rear];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Left => "left",
            Side::Right => "right",
            Side::Rear => "rear",
        }
    }

    pub fn boundary_field(&self) -> String {
        format!("{}_boundary_type", self.as_str())
    }

    pub fn road_name_field(&self) -> String {
        format!("road_details_{}", self.as_str())
    }

    pub fn road_width_field(&self) -> String {
        format!("road_details_{}_meters", self.as_str())
    }

    pub fn from_boundary_field(field: &str) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|side| side.boundary_field() == field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SideState {
    select_enabled: bool,
    road_visible: bool,
}

/// 基地四周界線；前側為道路時才開放其餘三側
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryControls {
    sides: [SideState; 4],
}

/// What the session must clear after a boundary change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryEffects {
    pub cleared_fields: Vec<String>,
}

impl Default for BoundaryControls {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundaryControls {
    pub fn new() -> Self {
        let mut controls = Self {
            sides: [SideState {
                select_enabled: false,
                road_visible: false,
            }; 4],
        };
        controls.reset();
        controls
    }

    pub fn reset(&mut self) {
        for (index, state) in self.sides.iter_mut().enumerate() {
            state.select_enabled = index == 0;
            state.road_visible = false;
        }
    }

    fn index(side: Side) -> usize {
        match side {
            Side::Front => 0,
            Side::Left => 1,
            Side::Right => 2,
            Side::Rear => 3,
        }
    }

    pub fn on_change(&mut self, side: Side, value: &str) -> BoundaryEffects {
        let mut effects = BoundaryEffects::default();
        let is_road = value == ROAD;
        self.sides[Self::index(side)].road_visible = is_road;
        if !is_road {
            effects.cleared_fields.push(side.road_name_field());
            effects.cleared_fields.push(side.road_width_field());
        }

        if side == Side::Front {
            for other in &Side::ALL[1..] {
                let state = &mut self.sides[Self::index(*other)];
                state.select_enabled = is_road;
                if !is_road {
                    state.road_visible = false;
                    effects.cleared_fields.push(other.boundary_field());
                    effects.cleared_fields.push(other.road_name_field());
                    effects.cleared_fields.push(other.road_width_field());
                }
            }
        }

        tracing::debug!("Boundary {} set to '{}'", side.as_str(), value);
        effects
    }

    pub fn is_select_enabled(&self, side: Side) -> bool {
        self.sides[Self::index(side)].select_enabled
    }

    pub fn is_road_visible(&self, side: Side) -> bool {
        self.sides[Self::index(side)].road_visible
    }

    /// `None` when the field is not a boundary control.
    pub fn field_active(&self, field: &str) -> Option<bool> {
        for side in Side::ALL {
            if field == side.boundary_field() {
                return Some(self.is_select_enabled(side));
            }
            if field == side.road_name_field() || field == side.road_width_field() {
                return Some(self.is_select_enabled(side) && self.is_road_visible(side));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_starts_hidden() {
        let toggle = ConditionalToggle::new("incentive_fsi", TRIGGER_YES, &["incentive_fsi_rating"]);
        assert_eq!(toggle.state(), ToggleState::HiddenDisabledEmpty);
        assert!(toggle.controls("incentive_fsi_rating"));
    }

    #[test]
    fn test_toggle_follows_checked_value() {
        let mut toggle = ConditionalToggle::new("electrical_line", TRIGGER_YES, &["electrical_line_voltage"]);
        assert_eq!(toggle.on_change("Yes"), ToggleState::VisibleEnabled);
        assert_eq!(toggle.on_change("No"), ToggleState::HiddenDisabledEmpty);
        assert_eq!(toggle.on_change("yes"), ToggleState::HiddenDisabledEmpty);
    }

    #[test]
    fn test_other_sides_locked_until_front_is_road() {
        let mut controls = BoundaryControls::new();
        assert!(controls.is_select_enabled(Side::Front));
        assert!(!controls.is_select_enabled(Side::Left));

        controls.on_change(Side::Front, ROAD);
        assert!(controls.is_select_enabled(Side::Rear));
        assert!(controls.is_road_visible(Side::Front));
        assert_eq!(controls.field_active("road_details_front_meters"), Some(true));

        controls.on_change(Side::Left, ROAD);
        assert!(controls.is_road_visible(Side::Left));

        let effects = controls.on_change(Side::Front, "Open Space");
        assert!(!controls.is_select_enabled(Side::Left));
        assert!(!controls.is_road_visible(Side::Left));
        assert!(effects.cleared_fields.contains(&"left_boundary_type".to_string()));
        assert!(effects.cleared_fields.contains(&"road_details_left_meters".to_string()));
        assert_eq!(controls.field_active("road_details_left"), Some(false));
    }

    #[test]
    fn test_side_from_field() {
        assert_eq!(Side::from_boundary_field("rear_boundary_type"), Some(Side::Rear));
        assert_eq!(Side::from_boundary_field("zone"), None);
        assert_eq!(BoundaryControls::new().field_active("zone"), None);
    }
}
