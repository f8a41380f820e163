//! The page abstraction DOM extractors read from.
//!
//! A [`Document`] is a rendered page: its URL, its current serialized DOM, a way to simulate a
//! click, and a generation counter that advances whenever the DOM changes. Extractors only ever
//! parse snapshots taken through [`Document::html`], so a document backed by a live browser and
//! a saved HTML file look the same to them.
//!
//! [`wait_for_element`] is the one suspension point extractors use: it watches the mutation
//! counter until a selector shows up inside a container, or gives up after a deadline.

use scraper::{Html, Selector};
use tokio::sync::watch;

use super::*;

/// A rendered page that can be read, clicked and observed.
#[async_trait]
pub trait Document: Send + Sync {
  /// URL the page was loaded from.
  fn url(&self) -> String;

  /// The current DOM serialized as HTML.
  fn html(&self) -> String;

  /// Simulates a click on the `nth` element matching `selector`.
  ///
  /// Clicking an element that does not exist is not an error.
  async fn click(&self, selector: &str, nth: usize) -> Result<()>;

  /// Subscribes to DOM mutations.
  ///
  /// The received value is a generation counter bumped on every change. Dropping the receiver
  /// ends the subscription.
  fn observe(&self) -> watch::Receiver<u64>;
}

/// A fixed page snapshot.
///
/// Clicks do nothing and the DOM never changes, so waiting on it only succeeds for content that
/// is already present.
///
/// # Examples
///
/// ```
/// use paperlink::document::{Document, StaticDocument};
///
/// let page = StaticDocument::new("https://arxiv.org/abs/1706.03762", "<html></html>");
/// assert_eq!(page.url(), "https://arxiv.org/abs/1706.03762");
/// ```
#[derive(Debug)]
pub struct StaticDocument {
  /// Page URL
  url:         String,
  /// Page HTML
  html:        String,
  /// Never sends; kept alive so subscribers stay connected.
  generations: watch::Sender<u64>,
}

impl StaticDocument {
  /// Creates a snapshot from a URL and its HTML.
  pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
    let (generations, _) = watch::channel(0);
    Self { url: url.into(), html: html.into(), generations }
  }

  /// Reads the HTML of a saved page from disk.
  pub fn from_file(url: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
    let html = std::fs::read_to_string(path)?;
    Ok(Self::new(url, html))
  }
}

#[async_trait]
impl Document for StaticDocument {
  fn url(&self) -> String { self.url.clone() }

  fn html(&self) -> String { self.html.clone() }

  async fn click(&self, selector: &str, nth: usize) -> Result<()> {
    trace!("Ignoring click on {}[{}] of a static page", selector, nth);
    Ok(())
  }

  fn observe(&self) -> watch::Receiver<u64> { self.generations.subscribe() }
}

/// Whether the `nth` element matching `container` holds any of `selectors`.
///
/// Selectors that do not parse never match.
pub fn container_has_any(html: &str, container: &str, nth: usize, selectors: &[&str]) -> bool {
  let Ok(container) = Selector::parse(container) else {
    return false;
  };
  let document = Html::parse_document(html);
  let Some(element) = document.select(&container).nth(nth) else {
    return false;
  };
  selectors
    .iter()
    .filter_map(|s| Selector::parse(s).ok())
    .any(|selector| element.select(&selector).next().is_some())
}

/// Waits until the `nth` `container` of the page holds one of `selectors`.
///
/// Resolves to `Some(())` as soon as the content is present, possibly immediately. Resolves to
/// `None` when `timeout` elapses or the document stops publishing mutations. The mutation
/// subscription is released on every path.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use paperlink::document::{wait_for_element, StaticDocument};
///
/// # async fn example() {
/// let page = StaticDocument::new("https://example.org", "<div class='panel'><p class='done'></p></div>");
/// let found = wait_for_element(&page, ".panel", 0, &[".done"], Duration::from_millis(10)).await;
/// assert!(found.is_some());
/// # }
/// ```
pub async fn wait_for_element(
  document: &dyn Document,
  container: &str,
  nth: usize,
  selectors: &[&str],
  timeout: Duration,
) -> Option<()> {
  let mut mutations = document.observe();

  let outcome = tokio::time::timeout(timeout, async {
    loop {
      if container_has_any(&document.html(), container, nth, selectors) {
        return Some(());
      }
      if mutations.changed().await.is_err() {
        debug!("Document stopped publishing mutations while waiting on {}[{}]", container, nth);
        return None;
      }
    }
  })
  .await;

  drop(mutations);
  outcome.unwrap_or_else(|_| {
    debug!("Timed out after {:?} waiting on {}[{}] for {:?}", timeout, container, nth, selectors);
    None
  })
}

/// A document whose DOM can be swapped at runtime, for exercising waits.
#[cfg(test)]
pub(crate) mod scripted {
  use std::sync::{Arc, Mutex};

  use super::*;

  /// Mutable in-memory page. Clicking the `nth` match of a registered selector replaces the
  /// HTML after a delay.
  #[derive(Clone)]
  pub(crate) struct ScriptedDocument {
    /// Page URL
    url:         String,
    /// Current DOM
    html:        Arc<Mutex<String>>,
    /// Mutation counter
    generations: Arc<watch::Sender<u64>>,
    /// `(selector, nth) -> (delay, html after the click)`
    reactions:   Arc<Mutex<Vec<(String, usize, Duration, String)>>>,
  }

  impl ScriptedDocument {
    pub(crate) fn new(url: &str, html: &str) -> Self {
      let (generations, _) = watch::channel(0);
      Self {
        url:         url.to_string(),
        html:        Arc::new(Mutex::new(html.to_string())),
        generations: Arc::new(generations),
        reactions:   Arc::default(),
      }
    }

    /// Registers the HTML a click produces.
    pub(crate) fn on_click(&self, selector: &str, nth: usize, delay: Duration, html: &str) {
      self.reactions.lock().unwrap().push((selector.to_string(), nth, delay, html.to_string()));
    }

    /// Replaces the DOM and notifies observers.
    pub(crate) fn set_html(&self, html: &str) {
      *self.html.lock().unwrap() = html.to_string();
      self.generations.send_modify(|generation| *generation += 1);
    }

    /// Number of live subscriptions.
    pub(crate) fn observers(&self) -> usize { self.generations.receiver_count() }
  }

  #[async_trait]
  impl Document for ScriptedDocument {
    fn url(&self) -> String { self.url.clone() }

    fn html(&self) -> String { self.html.lock().unwrap().clone() }

    async fn click(&self, selector: &str, nth: usize) -> Result<()> {
      let reaction = self
        .reactions
        .lock()
        .unwrap()
        .iter()
        .find(|(s, n, ..)| s == selector && *n == nth)
        .map(|(_, _, delay, html)| (*delay, html.clone()));
      if let Some((delay, html)) = reaction {
        let document = self.clone();
        tokio::spawn(async move {
          tokio::time::sleep(delay).await;
          document.set_html(&html);
        });
      }
      Ok(())
    }

    fn observe(&self) -> watch::Receiver<u64> { self.generations.subscribe() }
  }
}

#[cfg(test)]
mod tests {
  use super::{scripted::ScriptedDocument, *};

  const PENDING: &str = "<div class='panel'><p class='loading'></p></div>";
  const LOADED: &str = "<div class='panel'><p class='abstract'>Text</p></div>";

  #[test]
  fn test_container_has_any() {
    assert!(container_has_any(LOADED, ".panel", 0, &[".missing", ".abstract"]));
    assert!(!container_has_any(LOADED, ".panel", 1, &[".abstract"]));
    assert!(!container_has_any(PENDING, ".panel", 0, &[".abstract"]));
    assert!(!container_has_any(LOADED, "!!", 0, &[".abstract"]));
  }

  #[tokio::test]
  async fn test_static_document_times_out() {
    let page = StaticDocument::new("https://example.org", PENDING);
    let found = wait_for_element(&page, ".panel", 0, &[".abstract"], Duration::from_millis(20)).await;
    assert!(found.is_none());
  }

  #[tokio::test]
  async fn test_wait_resolves_after_mutation() {
    let page = ScriptedDocument::new("https://example.org", PENDING);
    page.on_click("button", 0, Duration::from_millis(10), LOADED);
    page.click("button", 0).await.unwrap();

    let found = wait_for_element(&page, ".panel", 0, &[".abstract"], Duration::from_secs(2)).await;
    assert!(found.is_some());
    assert_eq!(page.observers(), 0);
  }

  #[traced_test]
  #[tokio::test]
  async fn test_timeout_releases_subscription() {
    let page = ScriptedDocument::new("https://example.org", PENDING);
    page.on_click("button", 0, Duration::from_secs(5), LOADED);
    page.click("button", 0).await.unwrap();

    let found = wait_for_element(&page, ".panel", 0, &[".abstract"], Duration::from_millis(20)).await;
    assert!(found.is_none());
    assert_eq!(page.observers(), 0);
    assert!(logs_contain("Timed out"));
  }
}
