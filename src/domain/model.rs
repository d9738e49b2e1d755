use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// JSON 參照表的 id 可能是數字也可能是字串，一律以字串形式比較
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => RecordId(text),
            Raw::Number(number) => RecordId(number.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub landuser_id: Option<RecordId>,
    #[serde(default)]
    pub allowed_uses: Vec<RecordId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Use {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub zone_id: Option<RecordId>,
}

/// ULB / RP / Special Authority
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ulb {
    pub id: RecordId,
    #[serde(default)]
    pub district_name: Option<String>,
    pub taluka_name: String,
    pub council_id: RecordId,
    #[serde(default)]
    pub council_name: Option<String>,
    #[serde(default)]
    pub type_id: Option<RecordId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySpecificArea {
    pub id: RecordId,
    #[serde(alias = "citySpecificArea")]
    pub name: String,
    pub council_id: RecordId,
    #[serde(default)]
    pub area_code: Option<RecordId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingType {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub proposal_id: Option<RecordId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingSubtype {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "bldgtypeID", default)]
    pub bldgtype_id: Option<RecordId>,
}

/// 子類型有兩種寫法：帶 bldgtypeID 的平面清單，或以建物類型 id 為鍵的物件
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubtypeTable {
    List(Vec<BuildingSubtype>),
    ByType(BTreeMap<String, Vec<BuildingSubtype>>),
}

impl SubtypeTable {
    pub fn into_list(self) -> Vec<BuildingSubtype> {
        match self {
            SubtypeTable::List(list) => list,
            SubtypeTable::ByType(map) => map
                .into_iter()
                .flat_map(|(type_id, subtypes)| {
                    subtypes.into_iter().map(move |mut subtype| {
                        subtype.bldgtype_id = Some(RecordId::new(type_id.clone()));
                        subtype
                    })
                })
                .collect(),
        }
    }
}

impl Default for SubtypeTable {
    fn default() -> Self {
        SubtypeTable::List(Vec::new())
    }
}

/// `{id|value, name|text}` 形式的一般下拉選項
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupOption {
    #[serde(alias = "value")]
    pub id: RecordId,
    #[serde(alias = "text")]
    pub name: String,
}

/// 單一 `data.json` 的結構
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CombinedDocument {
    #[serde(default)]
    pub ulb_rp_special_authority: Vec<Ulb>,
    #[serde(default)]
    pub zone: Vec<Zone>,
    #[serde(default)]
    pub uses: Vec<Use>,
    #[serde(default)]
    pub city_specific_area: Vec<CitySpecificArea>,
    #[serde(default)]
    pub building_type: Vec<BuildingType>,
    #[serde(default, alias = "building_subtypes")]
    pub building_subtype: SubtypeTable,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Cached reference tables for one page session. Written once at load.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub ulbs: Vec<Ulb>,
    pub zones: Vec<Zone>,
    pub uses: Vec<Use>,
    pub city_specific_areas: Vec<CitySpecificArea>,
    pub building_types: Vec<BuildingType>,
    pub building_subtypes: Vec<BuildingSubtype>,
    pub lookups: BTreeMap<String, Vec<LookupOption>>,
}

impl ReferenceData {
    pub fn zone_by_id(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.id.as_str() == id)
    }

    /// Every `allowedUses` id that has no row in the uses table.
    pub fn integrity_issues(&self) -> Vec<String> {
        let known: BTreeSet<&str> = self.uses.iter().map(|u| u.id.as_str()).collect();
        self.zones
            .iter()
            .flat_map(|zone| {
                let known = &known;
                zone.allowed_uses
                    .iter()
                    .filter(move |id| !known.contains(id.as_str()))
                    .map(move |id| format!("zone '{}' allows unknown use id {}", zone.name, id))
            })
            .collect()
    }
}

/// 上傳的檔案（對應 `<input type="file">`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub size_bytes: u64,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            size_bytes: bytes.len() as u64,
            bytes,
        }
    }

    pub fn mime_from_extension(file_name: &str) -> &'static str {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("pdf") => "application/pdf",
            _ => "application/octet-stream",
        }
    }
}

/// 送出的表單內容：有序的文字欄位加上檔案
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, FileUpload)>,
}

impl FormPayload {
    /// Replaces an existing key in place, otherwise appends.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// JSON body; files are represented by their file name.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for (key, value) in &self.fields {
            object.insert(key.clone(), serde_json::Value::String(value.clone()));
        }
        for (key, file) in &self.files {
            object.insert(key.clone(), serde_json::Value::String(file.file_name.clone()));
        }
        serde_json::Value::Object(object)
    }
}

/// 伺服器確認送出成功
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_accepts_numbers_and_strings() {
        let zone: Zone = serde_json::from_value(serde_json::json!({
            "id": 3, "name": "Residential", "landuserId": "R1", "allowedUses": [1, "2"]
        }))
        .unwrap();
        assert_eq!(zone.id.as_str(), "3");
        assert_eq!(zone.landuser_id, Some(RecordId::from("R1")));
        assert_eq!(zone.allowed_uses, vec![RecordId::from(1), RecordId::from("2")]);
    }

    #[test]
    fn test_subtype_map_normalises_to_list() {
        let table: SubtypeTable = serde_json::from_value(serde_json::json!({
            "1": [{"id": 10, "name": "Row House"}],
            "2": [{"id": 20, "name": "Shop"}, {"id": 21, "name": "Mall"}]
        }))
        .unwrap();
        let list = table.into_list();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].bldgtype_id, Some(RecordId::from("1")));
        assert_eq!(list[2].bldgtype_id, Some(RecordId::from("2")));
    }

    #[test]
    fn test_integrity_issues_report_unknown_uses() {
        let data = ReferenceData {
            zones: vec![Zone {
                id: RecordId::from(1),
                name: "Green".to_string(),
                landuser_id: None,
                allowed_uses: vec![RecordId::from(1), RecordId::from(9)],
            }],
            uses: vec![Use {
                id: RecordId::from(1),
                name: "Agriculture".to_string(),
                zone_id: Some(RecordId::from(1)),
            }],
            ..Default::default()
        };
        let issues = data.integrity_issues();
        assert_eq!(issues, vec!["zone 'Green' allows unknown use id 9".to_string()]);
    }

    #[test]
    fn test_payload_set_replaces_in_place() {
        let mut payload = FormPayload::default();
        payload.set("zone", "1");
        payload.set("email", "a@b.co");
        payload.set("zone", "Residential");
        assert_eq!(payload.fields.len(), 2);
        assert_eq!(payload.fields[0], ("zone".to_string(), "Residential".to_string()));
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(FileUpload::mime_from_extension("plan.JPG"), "image/jpeg");
        assert_eq!(FileUpload::mime_from_extension("site.png"), "image/png");
        assert_eq!(FileUpload::mime_from_extension("notes.txt"), "application/octet-stream");
    }
}
