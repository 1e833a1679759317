/// Attachment picker panel
///
/// With no attachments, offers the "Add images" entry point with a hint
/// of the accepted formats and the count limit. Once files are attached,
/// the picker is replaced by the clear-images control, matching the
/// dialog it is modeled on (pick again only after clearing).

use iced::widget::{button, column, container, row, text};
use iced::{Alignment, Element, Length};

use crate::state::session::ComposeSession;
use crate::Message;

/// Build the picker panel for the session's current attachment state.
pub fn attachment_panel(session: &ComposeSession) -> Element<'static, Message> {
    if !session.has_attachments() {
        return empty_picker(session);
    }

    let count = session.accepted().len();
    let label = if count == 1 {
        "1 image attached".to_string()
    } else {
        format!("{} images attached", count)
    };

    container(
        row![
            text(label).size(16),
            button("Clear images").on_press(Message::ClearImages).padding(8),
        ]
        .spacing(16)
        .align_y(Alignment::Center),
    )
    .width(Length::Fill)
    .center_x(Length::Fill)
    .into()
}

fn empty_picker(session: &ComposeSession) -> Element<'static, Message> {
    let options = session.options();

    let formats: Vec<String> = options
        .allowed_mime_types
        .iter()
        .map(|mime| {
            mime.strip_prefix("image/")
                .unwrap_or(mime.as_str())
                .to_uppercase()
        })
        .collect();

    let hint = format!(
        "{}, up to {} images",
        formats.join(", "),
        options.max_attachments
    );

    container(
        column![
            button(text("Add images").size(20))
                .on_press(Message::AddImages)
                .padding(12),
            text(hint).size(14),
        ]
        .spacing(10)
        .align_x(Alignment::Center),
    )
    .width(Length::Fill)
    .height(Length::Fixed(180.0))
    .center_x(Length::Fill)
    .center_y(Length::Fixed(180.0))
    .into()
}
