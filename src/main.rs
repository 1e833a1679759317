use iced::widget::{button, column, container, row, text, text_input, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;

// Declare the application modules
mod accept;
mod config;
mod preview;
mod state;
mod ui;

use accept::{RejectReason, RejectedFile};
use config::ComposeOptions;
use preview::decoder::{self, DecodeError, DecodedPreview};
use state::data::RawFile;
use state::outbox::{self, Outbox, PostReceipt};
use state::session::ComposeSession;

/// Main application state
struct PostComposer {
    /// Database of submitted posts
    outbox: Outbox,
    /// Composer limits loaded from the config file
    options: ComposeOptions,
    /// The open compose dialog, if any
    session: Option<ComposeSession>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "New post"
    OpenComposer,
    /// User closed the compose dialog
    CloseComposer,
    /// User clicked "Add images"
    AddImages,
    /// Background inspection of the picked files completed
    SelectionReady(Vec<RawFile>),
    /// One attachment's preview decode settled
    PreviewDecoded {
        epoch: u64,
        index: usize,
        result: Result<DecodedPreview, DecodeError>,
    },
    /// Caption text changed
    CaptionChanged(String),
    /// User clicked "Clear images"
    ClearImages,
    /// Carousel navigation
    CarouselPrev,
    CarouselNext,
    CarouselJump(usize),
    /// User clicked "Post"
    Submit,
    /// Background post submission completed
    SubmitComplete(Result<PostReceipt, String>),
}

impl PostComposer {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // Initialize the database
        // If this fails, we panic because the app cannot function without its database
        let outbox = Outbox::new()
            .expect("Failed to initialize database. Check permissions and disk space.");

        let options = ComposeOptions::load();

        let post_count = outbox.post_count().unwrap_or(0);
        println!("📮 Post Composer initialized with {} posts", post_count);

        let status = format!("Ready. {} posts in outbox.", post_count);

        (
            PostComposer {
                outbox,
                options,
                session: None,
                status,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenComposer => {
                self.session = Some(ComposeSession::new(self.options.clone()));
                self.status = "Composing a new post.".to_string();
                Task::none()
            }
            Message::CloseComposer => {
                if let Some(session) = self.session.take() {
                    let released = session.close();
                    println!("🧹 Closed composer, released {} preview sources", released);
                }
                let post_count = self.outbox.post_count().unwrap_or(0);
                self.status = format!("Ready. {} posts in outbox.", post_count);
                Task::none()
            }
            Message::AddImages => {
                if self.session.is_none() {
                    return Task::none();
                }

                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Select Images to Attach")
                    .add_filter("Images", &["png", "jpg", "jpeg", "bmp"])
                    .pick_files();

                if let Some(paths) = picked {
                    self.status = format!("Inspecting {} files...", paths.len());

                    // Inspect the picked files in the background
                    return Task::perform(prepare_selection(paths), Message::SelectionReady);
                }

                Task::none()
            }
            Message::SelectionReady(files) => {
                let Some(session) = self.session.as_mut() else {
                    return Task::none();
                };

                let (rejected, jobs) = session.select_files(files);

                self.status = if rejected.is_empty() {
                    format!("Attached {} images.", session.accepted().len())
                } else {
                    format!(
                        "Attached {} images. ⚠️  {}",
                        session.accepted().len(),
                        rejection_summary(&rejected)
                    )
                };

                // Launch one decode task per accepted file; completions
                // come back tagged with their batch epoch and slot index
                let tasks: Vec<Task<Message>> = jobs
                    .into_iter()
                    .map(|job| {
                        let epoch = job.epoch;
                        let index = job.index;
                        Task::perform(decoder::decode_preview(job.path), move |result| {
                            Message::PreviewDecoded {
                                epoch,
                                index,
                                result,
                            }
                        })
                    })
                    .collect();

                Task::batch(tasks)
            }
            Message::PreviewDecoded {
                epoch,
                index,
                result,
            } => {
                match self.session.as_mut() {
                    Some(session) => {
                        session.settle_preview(epoch, index, result);
                    }
                    None => {
                        println!("🕓 Preview finished after composer closed; dropping");
                    }
                }
                Task::none()
            }
            Message::CaptionChanged(caption) => {
                if let Some(session) = self.session.as_mut() {
                    session.caption = caption;
                }
                Task::none()
            }
            Message::ClearImages => {
                if let Some(session) = self.session.as_mut() {
                    session.clear_images();
                    self.status = "Cleared images.".to_string();
                }
                Task::none()
            }
            Message::CarouselPrev => {
                if let Some(session) = self.session.as_mut() {
                    let count = session.preview_set().items.len();
                    session.carousel_prev(count);
                }
                Task::none()
            }
            Message::CarouselNext => {
                if let Some(session) = self.session.as_mut() {
                    let count = session.preview_set().items.len();
                    session.carousel_next(count);
                }
                Task::none()
            }
            Message::CarouselJump(index) => {
                if let Some(session) = self.session.as_mut() {
                    session.carousel_jump(index);
                }
                Task::none()
            }
            Message::Submit => {
                let Some(session) = self.session.as_ref() else {
                    return Task::none();
                };

                match session.can_submit() {
                    Err(blocked) => {
                        self.status = format!("⚠️  {}", blocked);
                        Task::none()
                    }
                    Ok(()) => {
                        self.status = "Posting...".to_string();

                        // The post records the original files, not the previews
                        Task::perform(
                            outbox::store_post_async(
                                self.outbox.path().clone(),
                                session.trimmed_caption().to_string(),
                                session.accepted().to_vec(),
                            ),
                            Message::SubmitComplete,
                        )
                    }
                }
            }
            Message::SubmitComplete(Ok(receipt)) => {
                self.status = format!(
                    "✅ Post #{} created with {} images!",
                    receipt.post_id, receipt.media_count
                );

                // Successful submit closes the composer
                if let Some(session) = self.session.take() {
                    let released = session.close();
                    println!("🧹 Submit complete, released {} preview sources", released);
                }

                Task::none()
            }
            Message::SubmitComplete(Err(error)) => {
                eprintln!("⚠️  Post submission failed: {}", error);
                self.status = format!("⚠️  Could not create post: {}", error);
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let content: Element<Message> = match &self.session {
            None => self.landing_view(),
            Some(session) => self.compose_view(session),
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    /// Start screen with the "New post" entry point
    fn landing_view(&self) -> Element<Message> {
        let content: Column<Message> = column![
            text("Post Composer").size(48),
            button("New post").on_press(Message::OpenComposer).padding(10),
            text(&self.status).size(16),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        content.into()
    }

    /// The compose dialog: previews, caption, actions
    fn compose_view<'a>(&'a self, session: &'a ComposeSession) -> Element<'a, Message> {
        let mut content = column![text("New post").size(32)].spacing(20).padding(40);

        if session.has_attachments() {
            content = content.push(ui::carousel::preview_area(session));
        }
        content = content.push(ui::picker::attachment_panel(session));

        content = content.push(
            text_input("Write a caption...", &session.caption)
                .on_input(Message::CaptionChanged)
                .padding(10),
        );

        content = content.push(
            row![
                button("Close").on_press(Message::CloseComposer).padding(10),
                button("Post").on_press(Message::Submit).padding(10),
            ]
            .spacing(16),
        );

        content = content.push(text(&self.status).size(14));

        content.max_width(700).into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application("Post Composer", PostComposer::update, PostComposer::view)
        .theme(PostComposer::theme)
        .centered()
        .run_with(PostComposer::new)
}

/// Build RawFile handles for the picked paths.
/// Runs in the background so slow filesystem metadata never blocks the UI.
async fn prepare_selection(paths: Vec<PathBuf>) -> Vec<RawFile> {
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => files.push(RawFile::new(path, metadata.len())),
            Err(e) => {
                eprintln!("⚠️  Skipping unreadable file {}: {}", path.display(), e);
            }
        }
    }

    files
}

/// One status line summarizing a selection's rejected files.
fn rejection_summary(rejected: &[RejectedFile]) -> String {
    let invalid: Vec<&str> = rejected
        .iter()
        .filter(|r| r.reason == RejectReason::UnsupportedType)
        .map(|r| r.file.name.as_str())
        .collect();
    let over_limit: Vec<&str> = rejected
        .iter()
        .filter(|r| r.reason == RejectReason::OverCountLimit)
        .map(|r| r.file.name.as_str())
        .collect();

    let mut parts = Vec::new();
    if !invalid.is_empty() {
        parts.push(format!("Invalid file format: {}", invalid.join(", ")));
    }
    if !over_limit.is_empty() {
        parts.push(format!("Over the image limit: {}", over_limit.join(", ")));
    }

    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(name: &str, reason: RejectReason) -> RejectedFile {
        RejectedFile {
            file: RawFile::new(PathBuf::from(format!("/pics/{}", name)), 1),
            reason,
        }
    }

    #[test]
    fn test_rejection_summary_groups_by_reason() {
        let summary = rejection_summary(&[
            rejected("notes.txt", RejectReason::UnsupportedType),
            rejected("late.png", RejectReason::OverCountLimit),
            rejected("clip.mov", RejectReason::UnsupportedType),
        ]);

        assert!(summary.contains("Invalid file format: notes.txt, clip.mov"));
        assert!(summary.contains("Over the image limit: late.png"));
    }

    #[tokio::test]
    async fn test_prepare_selection_skips_missing_files() {
        let existing = std::env::temp_dir().join("post_composer_prepare_test.png");
        std::fs::write(&existing, b"stub").unwrap();

        let files = prepare_selection(vec![
            existing.clone(),
            PathBuf::from("/nonexistent/gone.png"),
        ])
        .await;

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].byte_length, 4);

        let _ = std::fs::remove_file(existing);
    }
}
