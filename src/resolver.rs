use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::client::{ItemsQuery, LibraryClient};
use crate::model::{Item, ItemId, SeasonGroups};

/// The current item together with every sibling in its series.
#[derive(Debug, Clone)]
pub struct SeriesContext {
  pub current: Item,
  pub series_id: ItemId,
  pub episodes: Vec<Item>,
}

impl SeriesContext {
  pub fn groups(&self) -> SeasonGroups {
    SeasonGroups::from_items(self.episodes.iter().cloned())
  }

  /// Panel heading: the series name, or the item's own name without one.
  pub fn title(&self) -> String {
    let name = self.current.series_name.as_deref().unwrap_or_else(|| self.current.display_name());
    format!("Select episode - {}", name)
  }
}

#[derive(Debug, Clone)]
pub enum Resolution {
  Resolved(SeriesContext),
  /// The item has no parent series.
  NotASeries,
  /// The series query came back empty.
  NotFound,
}

impl Resolution {
  /// Message shown to the viewer when there is nothing to list.
  pub fn user_message(&self) -> Option<&'static str> {
    match self {
      Resolution::Resolved(_) => None,
      Resolution::NotASeries => Some("The current item is not an episode; there is no episode list to show."),
      Resolution::NotFound => Some("No episodes were found for this series."),
    }
  }
}

/// Resolve `current`'s series and its ordered episode list. Network failures
/// surface as errors; nothing is retried.
pub async fn resolve_context(client: &dyn LibraryClient, current: &ItemId) -> Result<Resolution> {
  let user = client.current_user_id().await.context("Failed to look up current user")?;
  let item = client.item(&user, current).await.with_context(|| format!("Failed to fetch item {}", current))?;
  let Some(series_id) = item.series_id.clone() else {
    info!(item = %current, "resolver: item has no parent series");
    return Ok(Resolution::NotASeries);
  };
  let episodes = client
    .items(&user, &ItemsQuery::series_episodes(&series_id))
    .await
    .with_context(|| format!("Failed to list episodes of series {}", series_id))?;
  if episodes.is_empty() {
    info!(series = %series_id, "resolver: series has no episodes");
    return Ok(Resolution::NotFound);
  }
  debug!(series = %series_id, count = episodes.len(), "resolver: episodes resolved");
  Ok(Resolution::Resolved(SeriesContext { current: item, series_id, episodes }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::episode;
  use crate::sim::StaticLibrary;

  #[tokio::test]
  async fn resolves_series_and_groups() {
    let library = StaticLibrary::demo();
    let Resolution::Resolved(ctx) = resolve_context(&library, &ItemId::new("ep5")).await.unwrap() else {
      panic!("expected a resolved series");
    };
    assert_eq!(ctx.series_id, ItemId::new("s1"));
    assert_eq!(ctx.title(), "Select episode - The Long Road");
    let groups = ctx.groups();
    assert_eq!(groups.seasons().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(groups.episodes(1).len(), 6);
    assert_eq!(groups.season_of(&ItemId::new("ep5")), Some(1));
  }

  #[tokio::test]
  async fn item_without_series_is_not_a_series() {
    let library = StaticLibrary::demo();
    let resolution = resolve_context(&library, &ItemId::new("movie1")).await.unwrap();
    assert!(matches!(resolution, Resolution::NotASeries));
    assert!(resolution.user_message().is_some());
  }

  #[tokio::test]
  async fn empty_series_is_not_found() {
    let mut orphan = episode("orphan", Some(1), Some(1));
    orphan.series_id = Some(ItemId::new("gone"));
    orphan.kind = crate::model::ItemKind::Other("Video".to_string());
    let library = StaticLibrary::new(vec![orphan]);
    let resolution = resolve_context(&library, &ItemId::new("orphan")).await.unwrap();
    assert!(matches!(resolution, Resolution::NotFound));
  }

  #[tokio::test]
  async fn network_failure_is_an_error() {
    let library = StaticLibrary::demo();
    library.set_offline(true);
    let err = resolve_context(&library, &ItemId::new("ep5")).await.unwrap_err();
    assert!(format!("{:#}", err).contains("network unreachable"));
  }

  #[test]
  fn title_falls_back_to_item_name() {
    let mut current = episode("ep1", Some(1), Some(1));
    current.series_name = None;
    let ctx = SeriesContext { current, series_id: ItemId::new("s"), episodes: Vec::new() };
    assert_eq!(ctx.title(), "Select episode - Name of ep1");
  }
}
