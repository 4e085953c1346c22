//! Navigation bar
//!
//! Contains the Files dropdown (Open), an Analyze All shortcut, the drag
//! status, and the theme toggle.

use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Element, Length, Padding};

use firebat_core::drag::DragState;

use crate::Message;

/// Render the navigation bar
pub fn view_navigation(
    files_menu_open: bool,
    drag: &DragState,
    dark_mode: bool,
) -> Element<'static, Message> {
    let files_label = if files_menu_open { "Files ▲" } else { "Files ▼" };

    let left = row![
        button(text(files_label).size(11))
            .on_press(Message::ToggleFilesMenu)
            .padding(Padding::from([4, 8]))
            .style(if files_menu_open { button::primary } else { button::secondary }),
        button(text("Analyze All").size(11))
            .on_press(Message::AnalyzeAll)
            .padding(Padding::from([4, 8]))
            .style(button::secondary),
    ]
    .spacing(4);

    // While a panel is in flight, show what is moving and offer a way out
    let drag_status: Element<'static, Message> = match drag {
        DragState::Dragging { active, source } => row![
            text(format!("Moving {} from {} - pick a drop zone", active.title(), source)).size(11),
            button(text("Cancel Drag").size(11))
                .on_press(Message::DragCancel)
                .padding(Padding::from([4, 8]))
                .style(button::danger),
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into(),
        DragState::Idle => Space::new().into(),
    };

    let theme_label = if dark_mode { "Light Mode" } else { "Dark Mode" };

    row![
        left,
        Space::new().width(Length::Fill),
        drag_status,
        Space::new().width(12),
        button(text(theme_label).size(11))
            .on_press(Message::ToggleDarkMode)
            .padding(Padding::from([4, 8]))
            .style(button::secondary),
    ]
    .padding(Padding::from([4, 0]))
    .align_y(Alignment::Center)
    .into()
}

/// Render the Files dropdown
pub fn view_files_menu() -> Element<'static, Message> {
    let items = column![
        button(text("Open").size(10))
            .on_press(Message::OpenFile)
            .padding(Padding::from([4, 12]))
            .width(Length::Fill)
            .style(button::secondary),
    ]
    .spacing(2)
    .width(Length::Fixed(130.0));

    container(items)
        .padding(4)
        .style(container::bordered_box)
        .into()
}
