//! Shared UI components reusable across panels
//!
//! Contains:
//! - `code_line` - a monospace line on a tinted background, outlined when
//!   its instruction is hovered in any panel

use iced::widget::{container, mouse_area, text};
use iced::{Background, Border, Color, Element, Font, Length};

use firebat_core::session::Tint;

use crate::Message;

/// Neutral background for lines without an assigned color
const NEUTRAL: Color = Color { r: 0.95, g: 0.95, b: 0.96, a: 1.0 };

const HIGHLIGHT_BORDER: Color = Color { r: 0.23, g: 0.51, b: 0.96, a: 1.0 };

pub fn to_color(tint: Tint) -> Color {
    Color::from_rgb8(tint.r, tint.g, tint.b)
}

/// A tinted, hoverable code line tied to `assembly_index`.
pub fn code_line<'a>(
    data: &'a str,
    tint: Option<Tint>,
    assembly_index: usize,
    highlighted: bool,
) -> Element<'a, Message> {
    let background = tint.map(to_color).unwrap_or(NEUTRAL);

    let line = container(text(data).size(12).font(Font::MONOSPACE))
        .width(Length::Fill)
        .padding(6)
        .style(move |_theme: &iced::Theme| container::Style {
            text_color: Some(Color::BLACK),
            background: Some(Background::Color(background)),
            border: Border {
                color: if highlighted { HIGHLIGHT_BORDER } else { Color::from_rgb(0.8, 0.8, 0.8) },
                width: if highlighted { 2.0 } else { 1.0 },
                radius: 4.0.into(),
            },
            ..container::Style::default()
        });

    mouse_area(line)
        .on_enter(Message::Hover(Some(assembly_index)))
        .on_exit(Message::Hover(None))
        .into()
}

/// Gray hint shown when a panel has nothing to display
pub fn placeholder(message: &'static str) -> Element<'static, Message> {
    text(message).size(12).color([0.5, 0.5, 0.5]).into()
}
