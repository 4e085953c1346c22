//! Log Bar (Bottom)
//!
//! Collapsed: the latest entry on one line.
//! Expanded: every retained entry, newest first.
//! Clicking the bar toggles between the two.

use iced::widget::{button, column, container, scrollable, text, Column};
use iced::{Element, Length, Padding};

use firebat_core::log_sink::LogSink;

use crate::Message;

/// Render the log bar
pub fn view_log_bar(log: &LogSink) -> Element<'_, Message> {
    let indicator = if log.is_expanded() { "▼" } else { "▲" };

    let header = button(text(format!("{} {}", indicator, log.headline())).size(11))
        .on_press(Message::ToggleLog)
        .padding(Padding::from([4, 8]))
        .width(Length::Fill)
        .style(button::text);

    if !log.is_expanded() || log.is_empty() {
        return container(header)
            .width(Length::Fill)
            .style(container::dark)
            .into();
    }

    let entries: Column<'_, Message> = log
        .entries()
        .rev()
        .fold(column![].spacing(2), |list, entry| list.push(text(entry).size(10)));

    let retained = text(format!("{} of {} entries kept", log.len(), log.capacity()))
        .size(10)
        .color([0.6, 0.6, 0.6]);

    container(column![
        header,
        scrollable(entries.padding(8)).height(Length::Fixed(200.0)),
        container(retained).padding(Padding::from([2, 8])),
    ])
        .width(Length::Fill)
        .style(container::dark)
        .into()
}
