//! Page mutation notifications and the debounce combinator.
//!
//! Whatever watches the host's DOM (a mutation observer in a browser binding,
//! the harness in tests) reduces each batch to a [`PageChange`] and sends it
//! down a channel. The detector never sees the watching primitive itself.

use std::time::Duration;
use tokio::sync::mpsc;

use crate::host::Node;

/// One batch of subtree insertions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageChange {
  pub added: Vec<Node>,
}

impl PageChange {
  pub fn added(nodes: impl IntoIterator<Item = Node>) -> Self {
    Self { added: nodes.into_iter().collect() }
  }

  /// True when any inserted subtree carries an element the detector cares
  /// about.
  pub fn is_relevant(&self, watched: &[&str]) -> bool {
    self.added.iter().flat_map(|n| n.walk()).any(|n| watched.iter().any(|s| matches_simple(n, s)))
  }
}

/// Match a node against a tag, `.class`, `#id` or `tag[attr='value']`
/// selector. Compound forms beyond those are treated as non-matching.
fn matches_simple(node: &Node, selector: &str) -> bool {
  if let Some(class) = selector.strip_prefix('.') {
    return node.has_class(class);
  }
  if let Some(id) = selector.strip_prefix('#') {
    return node.id.as_deref() == Some(id);
  }
  match selector.split_once('[') {
    Some((tag, rest)) => {
      let Some((name, value)) = rest.trim_end_matches(']').split_once('=') else { return false };
      let value = value.trim_matches(|c| c == '"' || c == '\'');
      (tag.is_empty() || node.tag == tag) && node.get_attr(name) == Some(value)
    }
    None => node.tag == selector,
  }
}

/// Collapses bursts of items into one wake-up after a quiet period.
///
/// Cancel safe: items already pulled off the channel stay pending if the
/// future returned by [`Debounced::next`] is dropped mid-burst.
pub struct Debounced<T> {
  rx: mpsc::UnboundedReceiver<T>,
  quiet: Duration,
  pending: Vec<T>,
}

impl<T> Debounced<T> {
  pub fn new(rx: mpsc::UnboundedReceiver<T>, quiet: Duration) -> Self {
    Self { rx, quiet, pending: Vec::new() }
  }

  /// Wait for the next burst and return everything it contained. Each new
  /// item restarts the quiet timer. `None` once the sender is gone and the
  /// queue is drained.
  pub async fn next(&mut self) -> Option<Vec<T>> {
    loop {
      if self.pending.is_empty() {
        let first = self.rx.recv().await?;
        self.pending.push(first);
      }
      match tokio::time::timeout(self.quiet, self.rx.recv()).await {
        Ok(Some(item)) => self.pending.push(item),
        Ok(None) | Err(_) => return Some(std::mem::take(&mut self.pending)),
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::time::Instant;

  const WATCHED: &[&str] = &["video", "div[data-type='video-osd']", ".btnVideoOsdSettings"];

  #[test]
  fn relevance_looks_into_subtrees() {
    let osd = PageChange::added([Node::new("div").child(Node::new("div").attr("data-type", "video-osd"))]);
    assert!(osd.is_relevant(WATCHED));
    let settings = PageChange::added([Node::new("button").class("btnVideoOsdSettings")]);
    assert!(settings.is_relevant(WATCHED));
    let player = PageChange::added([Node::new("div").class("htmlvideoplayer").child(Node::new("video"))]);
    assert!(player.is_relevant(WATCHED));
  }

  #[test]
  fn unrelated_insertions_are_ignored() {
    let toast = PageChange::added([Node::new("div").class("toast").text("saved")]);
    assert!(!toast.is_relevant(WATCHED));
    assert!(!PageChange::default().is_relevant(WATCHED));
  }

  #[tokio::test(start_paused = true)]
  async fn burst_collapses_into_one_wakeup() {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut debounced = Debounced::new(rx, Duration::from_millis(150));
    let start = Instant::now();
    tokio::spawn(async move {
      for i in 0..5 {
        let _ = tx.send(i);
        tokio::time::sleep(Duration::from_millis(100)).await;
      }
      tokio::time::sleep(Duration::from_secs(1)).await;
      let _ = tx.send(99);
    });
    assert_eq!(debounced.next().await, Some(vec![0, 1, 2, 3, 4]));
    // Last item at 400ms, quiet period 150ms.
    assert_eq!(start.elapsed(), Duration::from_millis(550));
    assert_eq!(debounced.next().await, Some(vec![99]));
    assert_eq!(debounced.next().await, None);
  }
}
