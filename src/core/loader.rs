use crate::domain::model::{
    BuildingType, CitySpecificArea, CombinedDocument, LookupOption, ReferenceData, SubtypeTable,
    Ulb, Use, Zone,
};
use crate::domain::ports::ReferenceSource;
use crate::utils::error::{IntakeError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const COMBINED_FILE: &str = "data.json";

/// 參照資料的檔案配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataLayout {
    /// One file per table, each `{ "<table>": [...] }`.
    #[default]
    Split,
    /// A single `data.json` with every table.
    Combined,
}

pub struct ReferenceDataLoader<S: ReferenceSource> {
    source: S,
    layout: DataLayout,
}

impl<S: ReferenceSource> ReferenceDataLoader<S> {
    pub fn new(source: S, layout: DataLayout) -> Self {
        Self { source, layout }
    }

    /// Fetches and parses every table. No retry; any failure fails the load.
    pub async fn load(&self) -> Result<ReferenceData> {
        tracing::info!(
            "📥 Loading reference data ({:?}) from {}",
            self.layout,
            self.source.describe()
        );
        let data = match self.layout {
            DataLayout::Split => self.load_split().await?,
            DataLayout::Combined => self.load_combined().await?,
        };
        tracing::info!(
            "✅ Reference data loaded: {} ULBs, {} zones, {} uses, {} areas, {} building types, {} subtypes",
            data.ulbs.len(),
            data.zones.len(),
            data.uses.len(),
            data.city_specific_areas.len(),
            data.building_types.len(),
            data.building_subtypes.len()
        );
        Ok(data)
    }

    async fn load_split(&self) -> Result<ReferenceData> {
        let (ulbs, building_types, building_subtypes, zones, uses, city_specific_areas) = tokio::try_join!(
            self.table::<Vec<Ulb>>("ulb_rp_special_authority.json", "ulb_rp_special_authority"),
            self.table::<Vec<BuildingType>>("building_type.json", "building_type"),
            self.table::<SubtypeTable>("building_subtype.json", "building_subtype"),
            self.table::<Vec<Zone>>("zone.json", "zone"),
            self.table::<Vec<Use>>("uses.json", "uses"),
            self.table::<Vec<CitySpecificArea>>("city_specific_area.json", "city_specific_area"),
        )
        .map_err(|e| {
            tracing::error!("Failed to load one or more required data files: {}", e);
            e
        })?;

        Ok(ReferenceData {
            ulbs,
            zones,
            uses,
            city_specific_areas,
            building_types,
            building_subtypes: building_subtypes.into_list(),
            lookups: BTreeMap::new(),
        })
    }

    async fn load_combined(&self) -> Result<ReferenceData> {
        let bytes = self.source.fetch(COMBINED_FILE).await?;
        let document: CombinedDocument =
            serde_json::from_slice(&bytes).map_err(|e| parse_error(COMBINED_FILE, e))?;

        let mut lookups = BTreeMap::new();
        for (table, value) in document.extra {
            match serde_json::from_value::<Vec<LookupOption>>(value) {
                Ok(rows) => {
                    lookups.insert(table, rows);
                }
                Err(e) => tracing::warn!("Skipping lookup table '{}': {}", table, e),
            }
        }

        Ok(ReferenceData {
            ulbs: document.ulb_rp_special_authority,
            zones: document.zone,
            uses: document.uses,
            city_specific_areas: document.city_specific_area,
            building_types: document.building_type,
            building_subtypes: document.building_subtype.into_list(),
            lookups,
        })
    }

    async fn table<T: DeserializeOwned>(&self, file: &str, key: &str) -> Result<T> {
        let bytes = self.source.fetch(file).await?;
        let mut document: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| parse_error(file, e))?;
        let table = document
            .get_mut(key)
            .map(serde_json::Value::take)
            .ok_or_else(|| IntakeError::DataLoadError {
                resource: file.to_string(),
                message: format!("missing top-level key '{}'", key),
            })?;
        serde_json::from_value(table).map_err(|e| parse_error(file, e))
    }
}

fn parse_error(resource: &str, error: serde_json::Error) -> IntakeError {
    IntakeError::DataLoadError {
        resource: resource.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MemorySource {
        files: HashMap<String, String>,
    }

    impl ReferenceSource for MemorySource {
        async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
            self.files
                .get(name)
                .map(|s| s.as_bytes().to_vec())
                .ok_or_else(|| IntakeError::DataLoadError {
                    resource: name.to_string(),
                    message: "HTTP error! status: 404".to_string(),
                })
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn split_files() -> HashMap<String, String> {
        let mut files = HashMap::new();
        files.insert(
            "ulb_rp_special_authority.json".to_string(),
            r#"{"ulb_rp_special_authority": [{"id": 1, "talukaName": "Haveli", "councilId": 9}]}"#.to_string(),
        );
        files.insert(
            "building_type.json".to_string(),
            r#"{"building_type": [{"id": 1, "name": "Residential", "proposalId": 4}]}"#.to_string(),
        );
        files.insert(
            "building_subtype.json".to_string(),
            r#"{"building_subtype": [{"id": 2, "name": "Row House", "bldgtypeID": 1}]}"#.to_string(),
        );
        files.insert(
            "zone.json".to_string(),
            r#"{"zone": [{"id": 1, "name": "Residential", "landuserId": 3}]}"#.to_string(),
        );
        files.insert(
            "uses.json".to_string(),
            r#"{"uses": [{"id": 5, "name": "Housing", "zoneId": 1}]}"#.to_string(),
        );
        files.insert(
            "city_specific_area.json".to_string(),
            r#"{"city_specific_area": [{"id": 8, "citySpecificArea": "Old City", "councilId": 9, "areaCode": "OC"}]}"#.to_string(),
        );
        files
    }

    #[test]
    fn test_split_layout_loads_every_table() {
        let loader = ReferenceDataLoader::new(MemorySource { files: split_files() }, DataLayout::Split);
        let data = tokio_test::block_on(loader.load()).unwrap();
        assert_eq!(data.ulbs[0].taluka_name, "Haveli");
        assert_eq!(data.city_specific_areas[0].name, "Old City");
        assert_eq!(data.building_subtypes[0].bldgtype_id.as_ref().unwrap().as_str(), "1");
    }

    #[test]
    fn test_split_layout_fails_when_any_file_missing() {
        let mut files = split_files();
        files.remove("uses.json");
        let loader = ReferenceDataLoader::new(MemorySource { files }, DataLayout::Split);
        let err = tokio_test::block_on(loader.load()).unwrap_err();
        assert!(matches!(err, IntakeError::DataLoadError { ref resource, .. } if resource == "uses.json"));
    }

    #[test]
    fn test_missing_table_key_is_reported() {
        let mut files = split_files();
        files.insert("zone.json".to_string(), r#"{"zones": []}"#.to_string());
        let loader = ReferenceDataLoader::new(MemorySource { files }, DataLayout::Split);
        let err = tokio_test::block_on(loader.load()).unwrap_err();
        assert!(err.to_string().contains("missing top-level key 'zone'"));
    }

    #[test]
    fn test_combined_layout_keeps_lookup_tables() {
        let mut files = HashMap::new();
        files.insert(
            COMBINED_FILE.to_string(),
            r#"{
                "zone": [{"id": 1, "name": "Green", "allowedUses": [1]}],
                "uses": [{"id": 1, "name": "Farm"}],
                "building_type": [{"id": 1, "name": "Industrial"}],
                "building_subtypes": {"1": [{"id": 4, "name": "Warehouse"}]},
                "special_scheme": [{"value": "S1", "text": "Slum Rehabilitation"}],
                "type_of_plot_layout": [{"id": 2, "name": "Approved Layout"}]
            }"#
            .to_string(),
        );
        let loader = ReferenceDataLoader::new(MemorySource { files }, DataLayout::Combined);
        let data = tokio_test::block_on(loader.load()).unwrap();
        assert!(data.ulbs.is_empty());
        assert_eq!(data.building_subtypes[0].bldgtype_id.as_ref().unwrap().as_str(), "1");
        assert_eq!(data.lookups["special_scheme"][0].name, "Slum Rehabilitation");
        assert_eq!(data.lookups["type_of_plot_layout"][0].id.as_str(), "2");
    }
}
