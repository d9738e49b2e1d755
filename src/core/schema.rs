use crate::core::toggle::Side;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Select,
    Radio,
    File,
    /// Filled from selected options, never typed.
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// Typed map of every form field, built once per session.
#[derive(Debug, Clone)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
}

/// Lookup tables in `data.json` whose field name differs from the table name.
pub const LOOKUP_FIELD_ALIASES: [(&str, &str); 3] = [
    ("type_of_plot_layout", "plot_layout_type"),
    ("plot_identification_type", "survey_type"),
    ("height_of_building", "building_height"),
];

pub fn lookup_field_name(table: &str) -> &str {
    LOOKUP_FIELD_ALIASES
        .iter()
        .find(|(t, _)| *t == table)
        .map(|(_, field)| *field)
        .unwrap_or(table)
}

impl FormSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
        Self { fields, index }
    }

    /// The building-permit intake form.
    pub fn udcpr() -> Self {
        use FieldKind::*;

        let mut fields = Vec::new();
        let mut add = |name: &str, kind: FieldKind, required: bool| {
            fields.push(FieldSpec {
                name: name.to_string(),
                kind,
                required,
            });
        };

        add("applicant_type", Select, true);
        add("applicant_name", Text, true);
        add("contact_no", Text, true);
        add("email", Text, true);
        add("project_name", Text, true);
        add("site_address", Text, true);
        add("dp_rp_part_plan", File, false);
        add("google_image", File, false);
        add("ulb_rp_special_authority", Select, true);
        add("special_scheme", Select, false);
        add("regularization", Radio, false);
        add("type_of_development", Select, false);
        add("incentive_fsi", Radio, false);
        add("incentive_fsi_rating", Select, false);
        add("type_of_proposal", Select, false);
        add("hilly_site", Radio, false);
        add("flood_affected_area", Radio, false);
        add("location", Select, false);
        add("electrical_line", Radio, false);
        add("electrical_line_voltage", Select, false);
        add("plot_layout_type", Select, false);
        add("reservation_area_affected", Radio, false);
        add("reservation_area_sqm", Text, false);
        add("crz_status", Radio, false);
        add("crz_location", Select, false);
        add("zone", Select, true);
        add("uses", Select, true);
        add("survey_type", Select, false);
        add("survey_number", Text, false);
        add("village_name", Text, true);
        add("area_plot_site_sqm", Text, true);
        add("area_plot_ownership_sqm", Text, true);
        add("area_plot_measurement_sqm", Text, true);
        add("pro_rata_fsi", Text, false);
        add("class_of_land", Select, false);
        add("dp_rp_road_affected", Radio, false);
        add("dp_rp_road_area_sqm", Text, false);
        add("city_specific_area", Select, false);
        add("building_height", Select, false);
        add("redevelopment_proposal", Radio, false);
        add("plot_width", Text, true);
        add("tod", Radio, false);
        add("building_type", Select, true);
        add("building_subtype", Select, false);
        for side in Side::ALL {
            add(&side.boundary_field(), Select, side == Side::Front);
            add(&side.road_name_field(), Text, false);
            add(&side.road_width_field(), Text, false);
        }
        add("ulb_type", Hidden, false);

        Self::new(fields)
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.get(name).map(|f| f.kind)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn of_kind(&self, kind: FieldKind) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(move |f| f.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules;

    #[test]
    fn test_every_rule_targets_a_schema_field() {
        let schema = FormSchema::udcpr();
        for rule in rules::rules() {
            assert!(schema.get(&rule.field).is_some(), "missing {}", rule.field);
        }
    }

    #[test]
    fn test_lookup_aliases() {
        assert_eq!(lookup_field_name("type_of_plot_layout"), "plot_layout_type");
        assert_eq!(lookup_field_name("special_scheme"), "special_scheme");
    }

    #[test]
    fn test_boundary_fields_present() {
        let schema = FormSchema::udcpr();
        assert_eq!(schema.kind("rear_boundary_type"), Some(FieldKind::Select));
        assert_eq!(schema.kind("road_details_left_meters"), Some(FieldKind::Text));
        assert_eq!(schema.kind("ulb_type"), Some(FieldKind::Hidden));
        assert_eq!(schema.of_kind(FieldKind::File).count(), 2);
    }
}
