use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 100-nanosecond ticks per minute, the host's runtime unit.
const TICKS_PER_MINUTE: u64 = 600_000_000;

/// Opaque, host-assigned item identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ItemId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ItemId {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

/// Type tag carried by every item record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum ItemKind {
  Episode,
  Other(String),
  #[default]
  Unknown,
}

impl From<String> for ItemKind {
  fn from(s: String) -> Self {
    match s.as_str() {
      "Episode" => ItemKind::Episode,
      "" => ItemKind::Unknown,
      _ => ItemKind::Other(s),
    }
  }
}

/// Immutable snapshot of one media item as returned by the host's data API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
  pub id: ItemId,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub overview: Option<String>,
  /// Position within the season.
  #[serde(default)]
  pub index_number: Option<u32>,
  /// Season ordinal.
  #[serde(default)]
  pub parent_index_number: Option<u32>,
  #[serde(default)]
  pub series_id: Option<ItemId>,
  #[serde(default)]
  pub series_name: Option<String>,
  #[serde(default)]
  pub run_time_ticks: Option<u64>,
  #[serde(default)]
  pub primary_image_aspect_ratio: Option<f64>,
  #[serde(rename = "Type", default)]
  pub kind: ItemKind,
}

impl Item {
  /// Season ordinal, defaulting to 1 when the record carries none.
  pub fn season(&self) -> u32 {
    self.parent_index_number.unwrap_or(1)
  }

  pub fn is_episode(&self) -> bool {
    self.kind == ItemKind::Episode
  }

  /// "Episode N", or "Special" for items without an in-season ordinal.
  pub fn label(&self) -> String {
    match self.index_number {
      Some(n) => format!("Episode {}", n),
      None => "Special".to_string(),
    }
  }

  pub fn display_name(&self) -> &str {
    self.name.as_deref().filter(|s| !s.trim().is_empty()).unwrap_or("Untitled")
  }

  pub fn runtime(&self) -> Option<String> {
    self.run_time_ticks.filter(|t| *t > 0).map(format_runtime)
  }
}

/// Paged result wrapper of the items-by-parent query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemsResult {
  #[serde(default)]
  pub items: Vec<Item>,
  #[serde(default)]
  pub total_record_count: Option<u64>,
}

/// Items of one series grouped by season ordinal.
///
/// Keys iterate in ascending numeric order. Every group is non-empty and
/// sorted by in-season ordinal; items without one keep their relative
/// order after the numbered ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonGroups(BTreeMap<u32, Vec<Item>>);

impl SeasonGroups {
  pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
    let mut groups: BTreeMap<u32, Vec<Item>> = BTreeMap::new();
    for item in items {
      groups.entry(item.season()).or_default().push(item);
    }
    for group in groups.values_mut() {
      group.sort_by_key(|item| item.index_number.unwrap_or(u32::MAX));
    }
    Self(groups)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn seasons(&self) -> impl Iterator<Item = u32> + '_ {
    self.0.keys().copied()
  }

  pub fn episodes(&self, season: u32) -> &[Item] {
    self.0.get(&season).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Season containing `id`, if any.
  pub fn season_of(&self, id: &ItemId) -> Option<u32> {
    self.0.iter().find(|(_, items)| items.iter().any(|item| &item.id == id)).map(|(season, _)| *season)
  }

  pub fn len(&self) -> usize {
    self.0.values().map(Vec::len).sum()
  }
}

/// Format a runtime in ticks as `h:mm` when at least an hour, otherwise `N min`.
pub fn format_runtime(ticks: u64) -> String {
  let minutes = ticks / TICKS_PER_MINUTE;
  let hours = minutes / 60;
  if hours > 0 { format!("{}:{:02}", hours, minutes % 60) } else { format!("{} min", minutes) }
}

#[cfg(test)]
pub(crate) fn episode(id: &str, season: Option<u32>, index: Option<u32>) -> Item {
  Item {
    id: ItemId::new(id),
    name: Some(format!("Name of {}", id)),
    overview: None,
    index_number: index,
    parent_index_number: season,
    series_id: Some(ItemId::new("series")),
    series_name: Some("Series".to_string()),
    run_time_ticks: Some(24 * TICKS_PER_MINUTE),
    primary_image_aspect_ratio: None,
    kind: ItemKind::Episode,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- Item deserialization ---

  #[test]
  fn item_parses_host_record() {
    let json = r#"{
      "Id": "ep6",
      "Name": "The Sixth",
      "IndexNumber": 6,
      "ParentIndexNumber": 1,
      "SeriesId": "s1",
      "SeriesName": "Show",
      "RunTimeTicks": 14400000000,
      "Type": "Episode",
      "UserData": { "Played": false }
    }"#;
    let item: Item = serde_json::from_str(json).unwrap();
    assert_eq!(item.id, ItemId::new("ep6"));
    assert_eq!(item.series_id, Some(ItemId::new("s1")));
    assert!(item.is_episode());
    assert_eq!(item.runtime().as_deref(), Some("24 min"));
  }

  #[test]
  fn item_without_type_or_series() {
    let item: Item = serde_json::from_str(r#"{"Id":"m1","Type":"Movie"}"#).unwrap();
    assert_eq!(item.kind, ItemKind::Other("Movie".to_string()));
    assert!(item.series_id.is_none());
    assert_eq!(item.season(), 1);
    assert_eq!(item.display_name(), "Untitled");
    assert_eq!(item.label(), "Special");
  }

  // --- SeasonGroups ---

  #[test]
  fn groups_partition_every_item_exactly_once() {
    let items = vec![
      episode("a", Some(2), Some(2)),
      episode("b", Some(1), Some(3)),
      episode("c", None, Some(1)),
      episode("d", Some(2), Some(1)),
      episode("e", Some(1), Some(2)),
    ];
    let groups = SeasonGroups::from_items(items.clone());
    assert_eq!(groups.len(), items.len());
    for item in &items {
      let hits = groups.seasons().filter(|s| groups.episodes(*s).iter().any(|i| i.id == item.id)).count();
      assert_eq!(hits, 1, "{} must appear in exactly one group", item.id);
    }
    assert!(groups.seasons().all(|s| !groups.episodes(s).is_empty()));
  }

  #[test]
  fn groups_sorted_by_season_then_ordinal() {
    let groups = SeasonGroups::from_items(vec![
      episode("s10e1", Some(10), Some(1)),
      episode("s2e2", Some(2), Some(2)),
      episode("s2e1", Some(2), Some(1)),
      episode("s1e1", Some(1), Some(1)),
    ]);
    assert_eq!(groups.seasons().collect::<Vec<_>>(), vec![1, 2, 10]);
    let ids: Vec<_> = groups.episodes(2).iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["s2e1", "s2e2"]);
  }

  #[test]
  fn unnumbered_items_follow_numbered_ones() {
    let groups = SeasonGroups::from_items(vec![
      episode("special", Some(1), None),
      episode("e2", Some(1), Some(2)),
      episode("e1", Some(1), Some(1)),
    ]);
    let ids: Vec<_> = groups.episodes(1).iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["e1", "e2", "special"]);
  }

  #[test]
  fn zero_ordinals_are_real_values() {
    let item = episode("s0e0", Some(0), Some(0));
    assert_eq!(item.season(), 0);
    assert_eq!(item.label(), "Episode 0");
    let unnumbered = episode("loose", None, None);
    assert_eq!(unnumbered.season(), 1);
    assert_eq!(unnumbered.label(), "Special");
    let groups = SeasonGroups::from_items(vec![item, unnumbered]);
    assert_eq!(groups.seasons().collect::<Vec<_>>(), vec![0, 1]);
  }

  #[test]
  fn season_of_finds_containing_group() {
    let groups = SeasonGroups::from_items(vec![episode("x", Some(3), Some(1)), episode("y", Some(1), Some(1))]);
    assert_eq!(groups.season_of(&ItemId::new("x")), Some(3));
    assert_eq!(groups.season_of(&ItemId::new("missing")), None);
  }

  // --- format_runtime ---

  #[test]
  fn runtime_minutes_and_hours() {
    assert_eq!(format_runtime(0), "0 min");
    assert_eq!(format_runtime(45 * TICKS_PER_MINUTE), "45 min");
    assert_eq!(format_runtime(60 * TICKS_PER_MINUTE), "1:00");
    assert_eq!(format_runtime(125 * TICKS_PER_MINUTE + 59), "2:05");
  }
}
