//! AST Panel
//!
//! The decompiled C source.

use iced::widget::{column, container, text, Column, Space};
use iced::{Font, Length};

use firebat_core::session::SessionStore;

use super::shared::placeholder;
use crate::Message;

pub fn view(session: &SessionStore) -> Column<'_, Message> {
    let content = column![text("AST Panel").size(14), Space::new().height(8)];

    match session.decompilation().map(|d| d.data.decompiled.as_str()) {
        Some(source) if !source.is_empty() => content.push(column![
            text("Decompiled Code:").size(12),
            Space::new().height(4),
            container(text(source).size(12).font(Font::MONOSPACE))
                .width(Length::Fill)
                .padding(6)
                .style(container::rounded_box),
        ]),
        _ => content.push(placeholder(
            "No decompiled code available. Please select sections and run decompilation.",
        )),
    }
}
