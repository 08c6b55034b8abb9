use clap::{Args, Parser, Subcommand};
use eyre::Context;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_playlists::config::{Config, YOUTUBE_SCOPE};
use youtube_playlists::error::Error;
use youtube_playlists::setup_youtube_client;
use youtube_playlists::youtube_api::{
    ChannelSelector, PlaylistListResponse, ResourceId, YouTubeClient, next_page_request,
    request::ApiRequest,
};

/// Browse and edit YouTube playlists.
///
/// Without --channel-id or --username, acts on the channel of the user who authorizes access in
/// the browser.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    identity: Identity,

    /// API key used for --channel-id and --username lookups.
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OAuth client secrets downloaded from the Google API console.
    #[arg(long, env = "YOUTUBE_CLIENT_SECRETS", default_value = "client_secrets.json")]
    client_secrets: PathBuf,

    /// Where to cache the OAuth credential [default: <program>-oauth2.json].
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// OAuth scope to request; may be repeated.
    #[arg(long = "scope", default_value = YOUTUBE_SCOPE)]
    scopes: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
#[group(multiple = false)]
struct Identity {
    /// Look at the channel with this ID.
    #[arg(long)]
    channel_id: Option<String>,

    /// Look at the channel of this legacy username.
    #[arg(long)]
    username: Option<String>,
}

impl Identity {
    fn selector(&self) -> ChannelSelector {
        match (&self.channel_id, &self.username) {
            (Some(id), _) => ChannelSelector::Id(id.clone()),
            (None, Some(username)) => ChannelSelector::Username(username.clone()),
            (None, None) => ChannelSelector::Mine,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the channel's playlists.
    Playlists,
    /// List the channel's related playlists (uploads, likes, ...).
    Related,
    /// List the videos in a playlist.
    Items { playlist_id: String },
    /// Search for videos by title.
    Search { title: String },
    /// Insert a video into a playlist at the given zero-based position.
    Insert {
        playlist_id: String,
        position: u32,
        video_id: String,
    },
    /// Show title and region restrictions of videos.
    Videos {
        #[arg(required = true)]
        video_ids: Vec<String>,
        /// Also say whether each video can be watched from this region (e.g. `DE`).
        #[arg(long)]
        region: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Err(e) => match plain_failure(&e) {
            Some((message, code)) => {
                eprintln!("{message}");
                std::process::exit(code);
            }
            None => Err(e),
        },
        ok => ok,
    }
}

/// Errors that are printed as a single line with their own exit status instead of a full
/// report.
fn plain_failure(e: &eyre::Report) -> Option<(String, i32)> {
    match e.downcast_ref::<Error>()? {
        not_found @ Error::ChannelNotFound { .. } => Some((not_found.to_string(), 1)),
        _ => None,
    }
}

async fn run(cli: Cli) -> eyre::Result<()> {
    let program = std::env::args_os()
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_BIN_NAME")));
    let mut config = Config::for_program(&program);
    config.api_key = cli.api_key;
    config.client_secrets_file = cli.client_secrets;
    if let Some(credentials) = cli.credentials {
        config.credential_file = credentials;
    }
    config.scopes = cli.scopes;

    let selector = cli.identity.selector();
    let yt = setup_youtube_client(&config, &selector)
        .await
        .context("set up YouTube session")?;

    match cli.command {
        Command::Playlists => {
            let request = yt.playlists_for(&selector).await?;
            print_playlists(&yt, request).await?;
        }
        Command::Related => {
            let channel_request = yt.channel_for(&selector);
            let request = yt.related_playlists(&channel_request).await?;
            print_playlists(&yt, request).await?;
        }
        Command::Items { playlist_id } => {
            let mut request = Some(yt.playlist_items(&playlist_id));
            while let Some(current) = request {
                let page = yt.execute(&current).await.context("list playlist items")?;
                for item in &page.items {
                    let Some(snippet) = &item.snippet else {
                        continue;
                    };
                    let video_id = snippet
                        .resource_id
                        .as_ref()
                        .and_then(|r| r.video_id.as_deref())
                        .unwrap_or("-");
                    let privacy = item
                        .status
                        .as_ref()
                        .and_then(|s| s.privacy_status.as_deref())
                        .unwrap_or("-");
                    println!("{video_id}\t{privacy}\t{}", snippet.title);
                }
                request = next_page_request("playlistItem", &current, &page)?;
            }
        }
        Command::Search { title } => {
            let results = yt
                .execute(&yt.search_videos(&title))
                .await
                .context("search videos")?;
            for result in results.items {
                let video_id = result.id.video_id.as_deref().unwrap_or("-");
                println!("{video_id}\t{}", result.snippet.title);
            }
        }
        Command::Insert {
            playlist_id,
            position,
            video_id,
        } => {
            let request =
                yt.insert_playlist_item(&playlist_id, position, &ResourceId::video(&video_id));
            let item = yt
                .execute(&request)
                .await
                .context("insert playlist item")?;
            println!("{}", item.id.as_deref().unwrap_or("-"));
        }
        Command::Videos { video_ids, region } => {
            let videos = yt
                .execute(&yt.videos(&video_ids))
                .await
                .context("list videos")?;
            for video in videos.items {
                let restriction = video.content_details.and_then(|d| d.region_restriction);
                let summary = restriction
                    .as_ref()
                    .map_or_else(|| "unrestricted".to_string(), |r| r.to_string());
                match &region {
                    Some(region) => {
                        let viewable = restriction
                            .as_ref()
                            .is_none_or(|r| r.is_viewable_in(region));
                        let verdict = if viewable { "viewable" } else { "not viewable" };
                        println!(
                            "{}\t{summary}\t{verdict} in {region}",
                            video.snippet.title
                        );
                    }
                    None => println!("{}\t{summary}", video.snippet.title),
                }
            }
        }
    }

    Ok(())
}

async fn print_playlists(
    yt: &YouTubeClient,
    first: ApiRequest<PlaylistListResponse>,
) -> eyre::Result<()> {
    let mut request = Some(first);
    while let Some(current) = request {
        let page = yt.execute(&current).await.context("list playlists")?;
        for playlist in &page.items {
            println!("{}\t{}", playlist.id, playlist.snippet.title);
        }
        request = next_page_request("playlist", &current, &page)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_not_found_exits_with_one_line() {
        let e = eyre::Report::new(Error::ChannelNotFound {
            username: "nobody-here".to_string(),
        })
        .wrap_err("list playlists");
        assert_eq!(
            plain_failure(&e),
            Some(("No channel found for nobody-here".to_string(), 1))
        );
    }

    #[test]
    fn other_failures_get_a_full_report() {
        assert_eq!(plain_failure(&eyre::Report::new(Error::MissingApiKey)), None);
        assert_eq!(plain_failure(&eyre::eyre!("connection reset")), None);
    }

    #[test]
    fn identity_flags_pick_the_selector() {
        let cli = Cli::try_parse_from(["youtube-playlists", "--username", "bob", "playlists"])
            .unwrap();
        assert_eq!(cli.identity.selector(), ChannelSelector::Username("bob".into()));

        let cli = Cli::try_parse_from(["youtube-playlists", "related"]).unwrap();
        assert_eq!(cli.identity.selector(), ChannelSelector::Mine);

        assert!(
            Cli::try_parse_from([
                "youtube-playlists",
                "--username",
                "bob",
                "--channel-id",
                "UC1",
                "playlists"
            ])
            .is_err()
        );
    }
}
