/// Preview area for the compose dialog
///
/// Renders the current PreviewSet snapshot: a placeholder while the
/// first decodes are still running, a single centered image for one
/// attachment, or a carousel with navigation and a thumbnail strip for
/// several. Everything here reads session state; it never writes it.

use iced::widget::{button, column, container, image, row, text};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use crate::state::session::ComposeSession;
use crate::Message;

/// Height of the main preview image area
const PREVIEW_HEIGHT: f32 = 450.0;
/// Edge length of the thumbnail-strip entries
const THUMB_SIZE: f32 = 64.0;

/// Build the preview area for the session's current previews.
pub fn preview_area(session: &ComposeSession) -> Element<'static, Message> {
    let set = session.preview_set();

    if set.items.is_empty() {
        let placeholder = if set.is_loading {
            text("Loading images...").size(16)
        } else {
            // All decodes failed; the files are still attached and postable
            text("No previews available").size(16)
        };

        return container(placeholder)
            .width(Length::Fill)
            .height(Length::Fixed(120.0))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(120.0))
            .into();
    }

    if set.items.len() == 1 {
        return single_view(session, &set.items[0]);
    }

    carousel_view(session, &set)
}

/// One attachment: a single centered image.
fn single_view(
    session: &ComposeSession,
    record: &crate::preview::PreviewRecord,
) -> Element<'static, Message> {
    let Some(source) = session.source(record.source) else {
        return text("No previews available").size(16).into();
    };

    container(
        image(source.handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT)),
    )
    .width(Length::Fill)
    .center_x(Length::Fill)
    .into()
}

/// Several attachments: main image, prev/next controls, thumbnail strip.
fn carousel_view(
    session: &ComposeSession,
    set: &crate::preview::PreviewSet,
) -> Element<'static, Message> {
    let current = session.carousel_index(set.items.len());
    let record = &set.items[current];

    let main_image: Element<'static, Message> = match session.source(record.source) {
        Some(source) => image(source.handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT))
            .into(),
        None => text("No previews available").size(16).into(),
    };

    let controls = row![
        button(text("‹").size(24))
            .on_press(Message::CarouselPrev)
            .padding(8),
        text(format!("{} / {}", current + 1, set.items.len())).size(16),
        button(text("›").size(24))
            .on_press(Message::CarouselNext)
            .padding(8),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    let thumbs: Vec<Element<'static, Message>> = set
        .items
        .iter()
        .enumerate()
        .filter_map(|(i, record)| {
            let source = session.source(record.source)?;
            Some(
                button(
                    image(source.handle.clone())
                        .width(Length::Fixed(THUMB_SIZE))
                        .height(Length::Fixed(THUMB_SIZE)),
                )
                .on_press(Message::CarouselJump(i))
                .padding(2)
                .into(),
            )
        })
        .collect();

    let strip = Wrap::with_elements(thumbs).spacing(6.0).line_spacing(6.0);

    column![
        container(main_image).width(Length::Fill).center_x(Length::Fill),
        container(controls).width(Length::Fill).center_x(Length::Fill),
        container(strip).width(Length::Fill).center_x(Length::Fill),
    ]
    .spacing(10)
    .into()
}
