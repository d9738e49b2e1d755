use crate::core::dropdown::{Dropdown, SelectOption, DEFAULT_PLACEHOLDER};
use crate::domain::model::{
    BuildingSubtype, BuildingType, CitySpecificArea, LookupOption, ReferenceData, Ulb, Use, Zone,
};
use serde::{Deserialize, Serialize};

/// Zone→uses 的篩選規則。兩種規則結果不同，只能擇一使用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneUsesRule {
    /// `use.zoneId == zone.id`
    #[default]
    ZoneId,
    /// `use.id ∈ zone.allowedUses`
    AllowedUses,
}

/// Parent→child dropdown pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    ZoneUses(ZoneUsesRule),
    UlbCitySpecificArea,
    BuildingTypeSubtype,
}

impl Relation {
    pub fn all(rule: ZoneUsesRule) -> [Relation; 3] {
        [
            Relation::UlbCitySpecificArea,
            Relation::ZoneUses(rule),
            Relation::BuildingTypeSubtype,
        ]
    }

    pub fn parent(&self) -> &'static str {
        match self {
            Relation::ZoneUses(_) => "zone",
            Relation::UlbCitySpecificArea => "ulb_rp_special_authority",
            Relation::BuildingTypeSubtype => "building_type",
        }
    }

    pub fn child(&self) -> &'static str {
        match self {
            Relation::ZoneUses(_) => "uses",
            Relation::UlbCitySpecificArea => "city_specific_area",
            Relation::BuildingTypeSubtype => "building_subtype",
        }
    }

    pub fn initial_placeholder(&self) -> &'static str {
        match self {
            Relation::ZoneUses(_) => "Select Zone first",
            Relation::UlbCitySpecificArea => "Select ULB/RP/Special Authority first",
            Relation::BuildingTypeSubtype => "Select Building Type first",
        }
    }

    pub fn populated_placeholder(&self) -> &'static str {
        match self {
            Relation::UlbCitySpecificArea => "Select City Specific Area",
            _ => DEFAULT_PLACEHOLDER,
        }
    }

    pub fn empty_placeholder(&self) -> &'static str {
        match self {
            Relation::ZoneUses(_) => "No uses available for this zone",
            Relation::UlbCitySpecificArea => "No specific areas available for this ULB",
            Relation::BuildingTypeSubtype => "No subtypes available for this building type",
        }
    }

    /// Child rows for the selected parent option, in source order.
    pub fn child_options(&self, data: &ReferenceData, parent: &SelectOption) -> Vec<SelectOption> {
        match self {
            Relation::ZoneUses(rule) => {
                let Some(zone_id) = parent.data("zone-id") else {
                    return Vec::new();
                };
                let uses: Vec<&Use> = match rule {
                    ZoneUsesRule::ZoneId => data
                        .uses
                        .iter()
                        .filter(|u| u.zone_id.as_ref().map(|z| z.as_str()) == Some(zone_id))
                        .collect(),
                    ZoneUsesRule::AllowedUses => match data.zone_by_id(zone_id) {
                        Some(zone) => data
                            .uses
                            .iter()
                            .filter(|u| zone.allowed_uses.contains(&u.id))
                            .collect(),
                        None => {
                            tracing::error!("Selected zone {} not found", zone_id);
                            Vec::new()
                        }
                    },
                };
                uses.into_iter().map(|u| use_option(u, zone_id)).collect()
            }
            Relation::UlbCitySpecificArea => {
                let Some(council_id) = parent.data("council-id") else {
                    return Vec::new();
                };
                data.city_specific_areas
                    .iter()
                    .filter(|area| area.council_id.as_str() == council_id)
                    .map(area_option)
                    .collect()
            }
            Relation::BuildingTypeSubtype => data
                .building_subtypes
                .iter()
                .filter(|s| s.bldgtype_id.as_ref().map(|id| id.as_str()) == Some(parent.value.as_str()))
                .map(subtype_option)
                .collect(),
        }
    }
}

/// `updateChild(parentValue)`: always resets first, then repopulates when a
/// parent is selected. Zero rows leave the child disabled with a notice placeholder.
pub fn update_child(
    relation: Relation,
    data: Option<&ReferenceData>,
    child: &mut Dropdown,
    parent: Option<&SelectOption>,
) {
    child.reset(relation.initial_placeholder());

    let (Some(data), Some(parent)) = (data, parent) else {
        tracing::debug!("{} cleared; no {} selected", relation.child(), relation.parent());
        return;
    };

    let rows = relation.child_options(data, parent);
    if rows.is_empty() {
        child.reset(relation.empty_placeholder());
        tracing::info!(
            "No {} options for {} '{}'",
            relation.child(),
            relation.parent(),
            parent.value
        );
        return;
    }

    tracing::debug!(
        "Filtered {} {} rows for {} '{}'",
        rows.len(),
        relation.child(),
        relation.parent(),
        parent.value
    );
    child.populate(relation.populated_placeholder(), rows);
}

/// ULB 清單依 talukaName 排序（不分大小寫）
pub fn ulb_options(ulbs: &[Ulb]) -> Vec<SelectOption> {
    let mut sorted: Vec<&Ulb> = ulbs.iter().collect();
    sorted.sort_by_key(|ulb| ulb.taluka_name.to_lowercase());
    sorted
        .into_iter()
        .map(|ulb| {
            SelectOption::new(ulb.taluka_name.clone(), ulb.taluka_name.clone())
                .with_data("taluka-id", ulb.id.as_str())
                .with_data("council-id", ulb.council_id.as_str())
                .with_data("council-name", ulb.council_name.clone().unwrap_or_default())
        })
        .collect()
}

pub fn zone_options(zones: &[Zone]) -> Vec<SelectOption> {
    zones
        .iter()
        .map(|zone| {
            SelectOption::new(zone.name.clone(), zone.name.clone())
                .with_data("zone-id", zone.id.as_str())
                .with_data(
                    "landuser-id",
                    zone.landuser_id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
                )
        })
        .collect()
}

pub fn building_type_options(types: &[BuildingType]) -> Vec<SelectOption> {
    types
        .iter()
        .map(|bt| {
            SelectOption::new(bt.id.as_str(), bt.name.clone())
                .with_data("name", bt.name.clone())
                .with_data(
                    "proposal-id",
                    bt.proposal_id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
                )
        })
        .collect()
}

pub fn lookup_options(rows: &[LookupOption]) -> Vec<SelectOption> {
    rows.iter()
        .map(|row| SelectOption::new(row.id.as_str(), row.name.clone()))
        .collect()
}

fn use_option(row: &Use, zone_id: &str) -> SelectOption {
    SelectOption::new(row.id.as_str(), row.name.clone()).with_data("zone-id", zone_id)
}

fn area_option(area: &CitySpecificArea) -> SelectOption {
    SelectOption::new(area.id.as_str(), area.name.clone())
        .with_data(
            "area-code",
            area.area_code.as_ref().map(|c| c.to_string()).unwrap_or_default(),
        )
        .with_data("council-id", area.council_id.as_str())
}

fn subtype_option(subtype: &BuildingSubtype) -> SelectOption {
    SelectOption::new(subtype.id.as_str(), subtype.name.clone())
        .with_data("name", subtype.name.clone())
        .with_data(
            "bldgtype-id",
            subtype.bldgtype_id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RecordId;

    fn sample() -> ReferenceData {
        ReferenceData {
            zones: vec![
                Zone {
                    id: RecordId::from(1),
                    name: "Residential".into(),
                    landuser_id: Some(RecordId::from(11)),
                    allowed_uses: vec![RecordId::from(2), RecordId::from(3)],
                },
                Zone {
                    id: RecordId::from(2),
                    name: "Green".into(),
                    landuser_id: None,
                    allowed_uses: vec![],
                },
            ],
            uses: vec![
                Use { id: RecordId::from(1), name: "Housing".into(), zone_id: Some(RecordId::from(1)) },
                Use { id: RecordId::from(2), name: "Shops".into(), zone_id: Some(RecordId::from(1)) },
                Use { id: RecordId::from(3), name: "Farm".into(), zone_id: Some(RecordId::from(2)) },
            ],
            ..Default::default()
        }
    }

    fn zone_option(data: &ReferenceData, name: &str) -> SelectOption {
        zone_options(&data.zones)
            .into_iter()
            .find(|o| o.value == name)
            .unwrap()
    }

    #[test]
    fn test_zone_id_rule_filters_by_use_zone() {
        let data = sample();
        let parent = zone_option(&data, "Residential");
        let rows = Relation::ZoneUses(ZoneUsesRule::ZoneId).child_options(&data, &parent);
        let ids: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_allowed_uses_rule_filters_by_membership() {
        let data = sample();
        let parent = zone_option(&data, "Residential");
        let rows = Relation::ZoneUses(ZoneUsesRule::AllowedUses).child_options(&data, &parent);
        let ids: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn test_update_child_without_parent_resets() {
        let data = sample();
        let relation = Relation::ZoneUses(ZoneUsesRule::ZoneId);
        let mut child = Dropdown::new("uses", relation.initial_placeholder());
        let parent = zone_option(&data, "Residential");
        update_child(relation, Some(&data), &mut child, Some(&parent));
        assert_eq!(child.options().len(), 2);
        assert!(!child.is_disabled());

        update_child(relation, Some(&data), &mut child, None);
        assert!(child.is_disabled());
        assert!(child.options().is_empty());
        assert_eq!(child.placeholder(), "Select Zone first");
    }

    #[test]
    fn test_update_child_with_no_rows_stays_disabled() {
        let data = sample();
        let relation = Relation::ZoneUses(ZoneUsesRule::AllowedUses);
        let mut child = Dropdown::new("uses", relation.initial_placeholder());
        let parent = zone_option(&data, "Green");
        update_child(relation, Some(&data), &mut child, Some(&parent));
        assert!(child.is_disabled());
        assert_eq!(child.placeholder(), "No uses available for this zone");
    }

    #[test]
    fn test_ulb_options_sorted_case_insensitively() {
        let ulbs = ["pune", "Ahmednagar", "Nashik"]
            .iter()
            .enumerate()
            .map(|(i, name)| Ulb {
                id: RecordId::from(i as i64),
                district_name: None,
                taluka_name: name.to_string(),
                council_id: RecordId::from(100 + i as i64),
                council_name: None,
                type_id: None,
            })
            .collect::<Vec<_>>();
        let labels: Vec<String> = ulb_options(&ulbs).into_iter().map(|o| o.label).collect();
        assert_eq!(labels, vec!["Ahmednagar", "Nashik", "pune"]);
    }
}
