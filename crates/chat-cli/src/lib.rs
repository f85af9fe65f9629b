//! # chat-cli
//!
//! Terminal front-end over `ChatCore`: reads lines from stdin, prints the room's
//! messages and typing line to stdout.

pub mod commands;
pub mod render;

use chat_broker::{ChatClient, ChatCore, FnListener, RoomListener};
use chat_common::{AppConfig, AppError, AppResult, ErrorResponse};
use chat_core::{Message, PresenceSnapshot, RoomName, UserName};
use commands::{Command, HELP};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Display name shared between the input loop and the room listener
type Viewer = Arc<RwLock<UserName>>;

/// Listener printing the room to stdout from the viewer's perspective
fn printer(viewer: Viewer) -> Arc<dyn RoomListener> {
    let typing_viewer = viewer.clone();
    FnListener::new(
        move |message: &Message| {
            println!("{}", render::message(message, &viewer.read()));
            Ok(())
        },
        move |snapshot: &PresenceSnapshot| {
            if let Some(line) = render::typing(snapshot, &typing_viewer.read()) {
                println!("{line}");
            }
            Ok(())
        },
    )
}

/// Run the interactive session until `/quit` or end of input
pub async fn run(config: AppConfig, room: Option<&str>) -> AppResult<()> {
    let core = Arc::new(ChatCore::builder().chat_config(&config.chat).build()?);

    let initial_room = match room {
        Some(fragment) => RoomName::from_fragment(fragment)?,
        None => config.chat.default_room.clone(),
    };

    let viewer: Viewer = Arc::new(RwLock::new(UserName::random()));
    let mut client = ChatClient::new(core.clone(), viewer.read().clone());

    println!("{}", render::system(render::WELCOME));
    watch_connectivity(&core);

    client.switch_room(initial_room, printer(viewer.clone()))?;
    if let Some(room) = client.room() {
        println!("{}", render::switched(room));
    }
    info!(user = %client.user(), client_id = %client.id(), "Session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };
        if command == Command::Quit {
            break;
        }
        if let Err(e) = handle(&mut client, &viewer, command) {
            println!("{}", render::system(&ErrorResponse::from(&e).to_string()));
        }
    }

    client.leave()?;
    core.shutdown();
    Ok(())
}

fn handle(client: &mut ChatClient, viewer: &Viewer, command: Command) -> AppResult<()> {
    match command {
        Command::Say(text) => {
            client.send(&text)?;
        }
        Command::Join(fragment) => {
            let room = RoomName::from_fragment(&fragment)?;
            if client.switch_room(room, printer(viewer.clone()))? {
                if let Some(room) = client.room() {
                    println!("{}", render::switched(room));
                }
            }
        }
        Command::Name(name) => {
            let user = client.rename(&name)?.clone();
            println!("{}", render::system(&format!("You are now {user}")));
            *viewer.write() = user;
        }
        Command::Who => {
            let others = client.typing_others();
            if others.is_empty() {
                println!("{}", render::system("Nobody else is typing"));
            } else {
                let names: Vec<&str> = others.iter().map(UserName::as_str).collect();
                println!("{}", render::system(&format!("{} typing…", names.join(", "))));
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Unknown(word) => {
            return Err(AppError::validation(format!("unknown command /{word}")));
        }
        Command::Quit => {}
    }
    Ok(())
}

/// Print the current connectivity and every transition after it
fn watch_connectivity(core: &ChatCore) {
    let mut rx = core.connectivity();
    println!("{}", render::connectivity(*rx.borrow_and_update()));

    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = *rx.borrow_and_update();
            println!("{}", render::connectivity(state));
        }
    });
}
