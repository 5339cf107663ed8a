use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use shared::domain::NavTarget;
use shell_core::{
    BufferedClipboard, HeadlessViewport, HttpFragmentSource, MemoryHistory, MissingClipboard,
    ShellConfig, ShellController,
};

#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the site server, e.g. http://127.0.0.1:8443
    #[arg(long)]
    server_url: String,
    /// Section to navigate to after the initial load.
    #[arg(long)]
    section: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let mut nav_targets = vec![
        NavTarget::new("why", "Why"),
        NavTarget::new("pricing", "Pricing"),
    ];
    if let Some(section) = &args.section {
        if !nav_targets.iter().any(|t| t.section.as_str() == section) {
            nav_targets.push(NavTarget::new(section.as_str(), section.as_str()));
        }
    }

    let fallback = Arc::new(BufferedClipboard::default());
    let controller = ShellController::new_with_dependencies(
        ShellConfig {
            nav_targets: nav_targets.clone(),
            ..ShellConfig::default()
        },
        Arc::new(HttpFragmentSource::new(args.server_url)),
        Arc::new(MemoryHistory::new()),
        Arc::new(HeadlessViewport::default()),
        Arc::new(MissingClipboard),
        fallback.clone(),
    );
    let mut events = controller.subscribe_events();

    controller.start().await;

    if let Some(section) = &args.section {
        if let Some(index) = nav_targets
            .iter()
            .position(|t| t.section.as_str() == section)
        {
            controller.activate_nav_target(index).await;
        }
    }

    if !controller.copy_buttons().await.is_empty() {
        controller.activate_copy_button(0).await;
        if let Some(copied) = fallback.contents().await {
            println!("copied: {copied}");
        }
    }

    while let Ok(event) = events.try_recv() {
        println!("event: {event:?}");
    }

    println!("current section: {}", controller.current_section().await);
    for (section, active) in controller.active_links().await {
        let marker = if active { "*" } else { " " };
        println!("  [{marker}] #{section}");
    }
    println!("{}", controller.content_html().await);

    Ok(())
}
