use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use osd_episodes::agent::{Agent, UiEvent};
use osd_episodes::changes::PageChange;
use osd_episodes::client::HttpLibraryClient;
use osd_episodes::config::Config;
use osd_episodes::constants::constants;
use osd_episodes::feedback::DomFeedback;
use osd_episodes::host::{HostPage, Node};
use osd_episodes::logging;
use osd_episodes::model::{ItemId, SeasonGroups};
use osd_episodes::panel::PanelEvent;
use osd_episodes::resolver::{Resolution, resolve_context};
use osd_episodes::sim::{RecordingActivator, SimPage, StaticLibrary, spawn_detail_view};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Resolve an item's series on a live server and print its seasons
  Episodes {
    /// Item id of any episode in the series
    item: String,
    /// Server base URL, e.g. http://media.local:8096
    #[arg(long)]
    server: Option<String>,
    /// API token
    #[arg(long)]
    token: Option<String>,
    /// User id (looked up when omitted)
    #[arg(long)]
    user: Option<String>,
    /// Store the connection settings in prefs.toml
    #[arg(long)]
    save: bool,
  },
  /// Run the agent against the simulated page and switch between two episodes
  Simulate {
    /// Episode playing at startup
    #[arg(long, default_value = "ep5")]
    from: String,
    /// Episode to switch to
    #[arg(long, default_value = "ep6")]
    to: String,
    /// Never render the detail view's play button
    #[arg(long)]
    no_play_control: bool,
  },
  /// Print shell completions
  Completions { shell: Shell },
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  if let Command::Completions { shell } = args.command {
    clap_complete::generate(shell, &mut Args::command(), "osd-episodes", &mut std::io::stdout());
    return Ok(());
  }

  let _guard = match logging::init() {
    Ok(guard) => Some(guard),
    Err(e) => {
      eprintln!("warning: logging disabled: {:#}", e);
      None
    }
  };

  match args.command {
    Command::Episodes { item, server, token, user, save } => episodes(item, server, token, user, save).await,
    Command::Simulate { from, to, no_play_control } => simulate(from, to, no_play_control).await,
    Command::Completions { .. } => Ok(()),
  }
}

async fn episodes(
  item: String,
  server: Option<String>,
  token: Option<String>,
  user: Option<String>,
  save: bool,
) -> Result<()> {
  let config = Config::load().merged(server, token, user);
  let (url, token) = config.credentials()?;
  let client = HttpLibraryClient::connect(url, token, config.user_id.clone()).await?;
  if save {
    config.save();
  }

  let current = ItemId::new(item);
  match resolve_context(&client, &current).await? {
    Resolution::Resolved(context) => {
      println!("{}", context.title());
      print_groups(&context.groups(), &current);
      Ok(())
    }
    other => bail!("{}", other.user_message().unwrap_or("Nothing to list")),
  }
}

fn print_groups(groups: &SeasonGroups, current: &ItemId) {
  for season in groups.seasons() {
    println!("\nSeason {}", season);
    for item in groups.episodes(season) {
      let marker = if &item.id == current { "▶" } else { " " };
      let runtime = item.runtime().map(|r| format!("  ({})", r)).unwrap_or_default();
      println!("{} {:<12} {}{}  [{}]", marker, item.label(), item.display_name(), runtime, item.id);
    }
  }
}

async fn simulate(from: String, to: String, no_play_control: bool) -> Result<()> {
  let page = Arc::new(SimPage::new());
  let library = Arc::new(StaticLibrary::demo());
  if !no_play_control {
    spawn_detail_view(page.clone(), Duration::from_millis(300));
  }

  // Pressing the detail view's play button makes the host request playback
  // info for the target, which the agent observes.
  let slot: Arc<Mutex<Option<Arc<Agent>>>> = Arc::new(Mutex::new(None));
  let hook_slot = slot.clone();
  let target = to.clone();
  let activator = Arc::new(RecordingActivator::with_hook(move |_| {
    if let Some(agent) = hook_slot.lock().ok().and_then(|a| a.clone()) {
      agent.on_response(&format!("/Items/{}/PlaybackInfo", target), &playback_info(&target));
    }
    Ok(())
  }));
  let feedback = Arc::new(DomFeedback::new(page.clone()));
  let agent = Arc::new(Agent::new(page.clone(), library, activator.clone(), feedback));
  if let Ok(mut slot) = slot.lock() {
    *slot = Some(agent.clone());
  }

  let (change_tx, change_rx) = mpsc::unbounded_channel();
  let (event_tx, event_rx) = mpsc::unbounded_channel();
  let runner = tokio::spawn(agent.clone().run(change_rx, event_rx));

  page.with_playback_surface()?;
  let _ = change_tx.send(PageChange::added([Node::new("div").class("htmlvideoplayer").child(Node::new("video"))]));
  agent.on_response(&format!("/Items/{}/PlaybackInfo", from), &playback_info(&from));
  info!(from = %from, to = %to, "simulate: playback started");

  let entry_point = &constants().entry_point_button_id;
  let mut waited = Duration::ZERO;
  while page.by_id(entry_point).is_empty() {
    if waited > Duration::from_secs(5) {
      bail!("entry point never appeared; is {} an episode?", from);
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    waited += Duration::from_millis(100);
  }
  println!("entry point mounted after {:?}", waited);

  agent.handle(UiEvent::EntryPointClicked).await;
  if !agent.panel_open() {
    bail!("panel did not open: {:?}", page.alerts());
  }
  println!("panel open");
  let outcome = agent.handle(UiEvent::Panel(PanelEvent::SelectItem(ItemId::new(&to)))).await;
  println!("outcome: {:?}", outcome.context("selection did not start a transition")?);
  for (_, route) in page.route_log() {
    println!("route: {}", route);
  }
  for alert in page.alerts() {
    println!("alert:\n{}", alert);
  }
  println!("activations: {}", activator.calls().len());
  println!("now playing: {:?}", agent.current().get());

  if let Ok(mut slot) = slot.lock() {
    *slot = None;
  }
  drop(change_tx);
  drop(event_tx);
  runner.await.context("agent task panicked")?;
  Ok(())
}

fn playback_info(id: &str) -> String {
  format!(r#"{{"MediaSources":[{{"Id":"{}"}}]}}"#, id)
}
