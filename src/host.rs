//! Capabilities the host page lends to the agent.
//!
//! The agent never owns the page. Everything it reads or mutates goes through
//! these traits, so the same decision logic runs against a browser binding or
//! the in-memory [`crate::sim::SimPage`].

use anyhow::Result;

use crate::model::ItemId;

/// Opaque handle to a live element of the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementRef(pub u64);

/// Handle to a document-level listener registered through [`HostPage::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
  Keydown,
  Click,
}

/// Declarative element description handed to the host for insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
  pub tag: String,
  pub id: Option<String>,
  pub classes: Vec<String>,
  pub attrs: Vec<(String, String)>,
  pub style: Vec<(String, String)>,
  pub text: Option<String>,
  pub children: Vec<Node>,
}

impl Node {
  pub fn new(tag: &str) -> Self {
    Self { tag: tag.to_string(), ..Self::default() }
  }

  pub fn id(mut self, id: &str) -> Self {
    self.id = Some(id.to_string());
    self
  }

  pub fn class(mut self, class: &str) -> Self {
    self.classes.extend(class.split_whitespace().map(str::to_string));
    self
  }

  pub fn attr(mut self, name: &str, value: &str) -> Self {
    self.attrs.push((name.to_string(), value.to_string()));
    self
  }

  pub fn style(mut self, prop: &str, value: &str) -> Self {
    self.style.push((prop.to_string(), value.to_string()));
    self
  }

  pub fn text(mut self, text: impl Into<String>) -> Self {
    self.text = Some(text.into());
    self
  }

  pub fn child(mut self, child: Node) -> Self {
    self.children.push(child);
    self
  }

  pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
    self.children.extend(children);
    self
  }

  pub fn get_attr(&self, name: &str) -> Option<&str> {
    self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
  }

  pub fn has_class(&self, class: &str) -> bool {
    self.classes.iter().any(|c| c == class)
  }

  /// Depth-first walk over this node and its descendants.
  pub fn walk(&self) -> Vec<&Node> {
    let mut out = vec![self];
    for child in &self.children {
      out.extend(child.walk());
    }
    out
  }
}

/// DOM, route and dialog surface of the host page.
pub trait HostPage: Send + Sync {
  /// Live elements matching `selector`, in document order.
  fn query_all(&self, selector: &str) -> Vec<ElementRef>;

  fn query(&self, selector: &str) -> Option<ElementRef> {
    self.query_all(selector).into_iter().next()
  }

  fn exists(&self, selector: &str) -> bool {
    self.query(selector).is_some()
  }

  /// All elements carrying `id`. Ids are not enforced unique by the host.
  fn by_id(&self, id: &str) -> Vec<ElementRef> {
    self.query_all(&format!("#{}", id))
  }

  fn contains(&self, ancestor: ElementRef, el: ElementRef) -> bool;

  /// Rendered, laid out and not hidden by style.
  fn is_visible(&self, el: ElementRef) -> bool;

  fn is_enabled(&self, el: ElementRef) -> bool;

  fn insert_before(&self, anchor: ElementRef, node: Node) -> Result<ElementRef>;

  fn append_to_body(&self, node: Node) -> Result<ElementRef>;

  fn append_to_head(&self, node: Node) -> Result<ElementRef>;

  /// Replace the children of `parent`, returning the new child handles in order.
  fn replace_children(&self, parent: ElementRef, nodes: Vec<Node>) -> Result<Vec<ElementRef>>;

  /// Detach `el` and its subtree. Returns false when it was already gone.
  fn remove(&self, el: ElementRef) -> bool;

  fn clone_subtree(&self, el: ElementRef) -> Option<Node>;

  fn style(&self, el: ElementRef, prop: &str) -> Option<String>;

  /// `None` clears the inline property.
  fn set_style(&self, el: ElementRef, prop: &str, value: Option<&str>);

  fn toggle_class(&self, el: ElementRef, class: &str, on: bool);

  fn set_text(&self, el: ElementRef, text: &str);

  fn scroll_into_view(&self, el: ElementRef);

  /// Current fragment route, including the leading `#`.
  fn route(&self) -> String;

  fn set_route(&self, route: &str);

  fn title(&self) -> String;

  fn set_title(&self, title: &str);

  fn listen(&self, kind: ListenerKind) -> ListenerHandle;

  /// Returns false when the handle was not registered.
  fn unlisten(&self, handle: ListenerHandle) -> bool;

  /// Blocking confirmation dialog.
  fn alert(&self, message: &str);
}

/// Simulated user interaction with a native control.
pub trait Activator: Send + Sync {
  /// Focus, press, primary activation and release against `el`.
  fn activate(&self, el: ElementRef) -> Result<()>;
}

/// In-memory reference to the host's playback manager.
pub trait PlaybackManager: Send + Sync {
  fn now_playing(&self) -> Option<ItemId>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn node_builder_splits_classes() {
    let node = Node::new("button").id("b").class("paper-icon-button-light autoSize").attr("title", "Episodes");
    assert!(node.has_class("paper-icon-button-light"));
    assert!(node.has_class("autoSize"));
    assert_eq!(node.get_attr("title"), Some("Episodes"));
  }

  #[test]
  fn walk_is_depth_first() {
    let node = Node::new("div").id("a").child(Node::new("div").id("b").child(Node::new("span").id("c"))).child(
      Node::new("div").id("d"),
    );
    let ids: Vec<_> = node.walk().iter().filter_map(|n| n.id.as_deref()).collect();
    assert_eq!(ids, vec!["a", "b", "c", "d"]);
  }
}
