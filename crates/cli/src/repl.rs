//! Interactive session over stdin.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use roomshift_core::{
    DesignStyle, SessionController, SessionError, SessionEvent, SessionSnapshot, VideoJobState,
};

use crate::commands::{load_sources, video_path, write_artifacts, write_video};
use crate::state::AppState;

const HELP: &str = "\
Commands:
  signin <token>      sign in with an identity token
  signout             sign out and forget the stored token
  whoami              show the signed-in user
  upload <paths...>   replace the uploaded images
  style [name]        show or select the design style
  redesign            redesign the uploaded images
  keep <n>            pin or unpin result n (1-based)
  tour                generate a video tour in the background
  status              show the session state
  save <dir>          export results and the video tour
  config              show the configuration (secrets hidden)
  help                show this help
  quit                leave the session";

#[derive(Debug, Clone, PartialEq)]
enum ReplCommand {
    SignIn(String),
    SignOut,
    WhoAmI,
    Upload(Vec<PathBuf>),
    Style(Option<DesignStyle>),
    Redesign,
    Keep(usize),
    Tour,
    Status,
    Save(PathBuf),
    Config,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
fn parse_command(line: &str) -> Result<Option<ReplCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("signin", [token]) => ReplCommand::SignIn(token.to_string()),
        ("signin", _) => return Err("usage: signin <token>".to_string()),
        ("signout", []) => ReplCommand::SignOut,
        ("whoami", []) => ReplCommand::WhoAmI,
        ("upload", []) => return Err("usage: upload <paths...>".to_string()),
        ("upload", paths) => ReplCommand::Upload(paths.iter().map(PathBuf::from).collect()),
        ("style", []) => ReplCommand::Style(None),
        ("style", words) => {
            let style = words.join(" ").parse().map_err(|e| format!("{}", e))?;
            ReplCommand::Style(Some(style))
        }
        ("redesign", []) => ReplCommand::Redesign,
        ("keep", [n]) => match n.parse::<usize>() {
            Ok(n) if n > 0 => ReplCommand::Keep(n - 1),
            _ => return Err(format!("not a result number: {}", n)),
        },
        ("keep", _) => return Err("usage: keep <n>".to_string()),
        ("tour", []) => ReplCommand::Tour,
        ("status", []) => ReplCommand::Status,
        ("save", [dir]) => ReplCommand::Save(PathBuf::from(dir)),
        ("save", _) => return Err("usage: save <dir>".to_string()),
        ("config", []) => ReplCommand::Config,
        ("help", []) => ReplCommand::Help,
        ("quit" | "exit", []) => ReplCommand::Quit,
        (other, _) => return Err(format!("unknown command: {} (try `help`)", other)),
    };
    Ok(Some(command))
}

fn print_event(event: SessionEvent) {
    debug!(?event, "Session event");
    match event {
        SessionEvent::VideoPhase { phase } => eprintln!("[tour] {}", phase),
        SessionEvent::VideoFinished { state } => eprintln!("[tour] {}", state),
        _ => {}
    }
}

pub async fn run(state: &AppState) -> Result<()> {
    let controller = Arc::new(
        state
            .session()
            .with_update_callback(Arc::new(print_event)),
    );

    match controller.init().await {
        Ok(Some(user)) => println!("Welcome back, {} <{}>.", user.name, user.email),
        Ok(None) => println!("Not signed in. Use `signin <token>`."),
        Err(e) => warn!(error = %e, "Could not restore identity"),
    }
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        if command == ReplCommand::Quit {
            break;
        }
        if let Err(e) = execute(state, &controller, command).await {
            println!("error: {:#}", e);
        }
    }

    Ok(())
}

async fn execute(
    state: &AppState,
    controller: &Arc<SessionController>,
    command: ReplCommand,
) -> Result<()> {
    match command {
        ReplCommand::SignIn(token) => {
            let user = controller.sign_in(&token).await?;
            println!("Signed in as {} <{}>.", user.name, user.email);
        }
        ReplCommand::SignOut => {
            controller.sign_out().await?;
            println!("Signed out.");
        }
        ReplCommand::WhoAmI => match controller.snapshot().await.user {
            Some(user) => println!("{} <{}> {}", user.name, user.email, user.picture),
            None => println!("Not signed in."),
        },
        ReplCommand::Upload(paths) => {
            let sources = load_sources(&paths).await?;
            let count = sources.len();
            controller.upload(sources).await;
            println!("Uploaded {} image(s).", count);
        }
        ReplCommand::Style(None) => {
            let current = controller.snapshot().await.style;
            for (i, style) in DesignStyle::ALL.iter().enumerate() {
                let marker = if *style == current { '*' } else { ' ' };
                println!("{} {:>2}. {}", marker, i + 1, style);
            }
        }
        ReplCommand::Style(Some(style)) => {
            controller.select_style(style).await;
            println!("Style: {}", style);
        }
        ReplCommand::Redesign => {
            let count = controller.redesign().await?;
            println!("Redesigned {} image(s).", count);
        }
        ReplCommand::Keep(index) => match controller.toggle_keep(index).await {
            Some(true) => println!("Result {} kept.", index + 1),
            Some(false) => println!("Result {} released.", index + 1),
            None => println!("No result {}.", index + 1),
        },
        ReplCommand::Tour => {
            let controller = Arc::clone(controller);
            tokio::spawn(async move {
                match controller.generate_video_tour().await {
                    Ok(video) => println!(
                        "Video tour ready ({} bytes). Use `save <dir>` to export it.",
                        video.bytes.len()
                    ),
                    Err(SessionError::Video(failure)) if failure.invites_key_reselection() => {
                        println!("Video tour failed: {} Run `tour` again to pick a key.", failure)
                    }
                    Err(e) => println!("Video tour failed: {}", e),
                }
            });
            println!("Video tour started.");
        }
        ReplCommand::Status => print_status(&controller.snapshot().await),
        ReplCommand::Save(dir) => {
            let snapshot = controller.snapshot().await;
            let mut written =
                write_artifacts(&dir, snapshot.style, snapshot.present_artifacts()).await?;
            if let VideoJobState::Succeeded { ref video } = snapshot.video {
                let path = video_path(&dir, video);
                write_video(&path, video).await?;
                written.push(path);
            }
            for path in written {
                println!("{}", path.display());
            }
        }
        ReplCommand::Config => {
            println!(
                "{}",
                serde_json::to_string_pretty(&state.sanitized_config())?
            );
        }
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Quit => {}
    }
    Ok(())
}

fn print_status(snapshot: &SessionSnapshot) {
    match snapshot.user {
        Some(ref user) => println!("User:     {}", user.email),
        None => println!("User:     (signed out)"),
    }
    println!("Style:    {}", snapshot.style);
    println!("Key:      {}", if snapshot.key_selected { "selected" } else { "not selected" });

    for (i, (source, artifact)) in snapshot
        .sources
        .iter()
        .zip(&snapshot.artifacts)
        .enumerate()
    {
        let result = match artifact {
            Some(a) if a.kept => "kept",
            Some(_) => "ready",
            None => "-",
        };
        println!("  {:>2}. {:<32} {}", i + 1, source, result);
    }

    if snapshot.redesigning {
        println!("Redesign: running");
    }
    if let Some(ref error) = snapshot.error {
        println!("Error:    {}", error);
    }
    match snapshot.video {
        VideoJobState::Idle => println!("Video:    idle"),
        VideoJobState::Running { phase } => println!("Video:    {}", phase),
        VideoJobState::Succeeded { ref video } => {
            println!("Video:    ready ({} bytes)", video.bytes.len())
        }
        VideoJobState::Failed { ref failure } => println!("Video:    failed: {}", failure),
    }
}
