//! Section Panel
//!
//! Displays:
//! - Address input with Analyze / Decompile / Inspect commands
//! - Connected addresses of the last decompile-from-address request
//! - Known sections with selection checkboxes (disabled until analyzed)
//! - The last IR inspection, instruction by instruction

use iced::widget::{button, checkbox, column, row, rule, text, text_input, Column, Space};
use iced::{Alignment, Element, Font, Padding};

use firebat_core::session::{KnownSection, SessionStore};

use super::shared::placeholder;
use crate::{App, Message};

pub fn view(app: &App) -> Column<'_, Message> {
    let session = &app.bench.session;

    let address_row = row![
        text_input("Address (hex or decimal, empty = entry)", &app.address_input)
            .on_input(Message::AddressChanged)
            .on_submit(Message::AnalyzeSection)
            .size(11)
            .padding(4),
    ];

    let commands = row![
        small_button("Analyze", Message::AnalyzeSection),
        small_button("From Entry", Message::AnalyzeFromEntry),
        small_button("Analyze All", Message::AnalyzeAll),
    ]
    .spacing(4);

    let decompile_commands = row![
        small_button("Decompile Address", Message::DecompileAddress),
        small_button("Decompile Entry", Message::DecompileEntry),
        small_button("Inspect IR", Message::InspectIr),
    ]
    .spacing(4);

    let mut content = column![
        text("Section Panel").size(14),
        Space::new().height(8),
        address_row,
        commands,
        decompile_commands,
    ]
    .spacing(6);

    if let Some(entry) = session.entry_result() {
        content = content.push(text(entry).size(11));
    }

    content = content
        .push(rule::horizontal(1))
        .push(view_sections(session))
        .push(
            button(text("Decompile Selected").size(11))
                .on_press(Message::DecompileSelected)
                .padding(Padding::from([4, 10]))
                .style(button::primary),
        );

    if !session.inspect_result().is_empty() {
        content = content.push(rule::horizontal(1)).push(view_inspect(session));
    }

    content
}

fn view_sections(session: &SessionStore) -> Element<'_, Message> {
    let sections = session.known_sections();
    if sections.is_empty() {
        return placeholder("No sections known yet. Open a file and analyze it.");
    }

    let selected = sections.iter().filter(|s| s.selected).count();
    let mut list = column![text(format!("Known Sections ({} selected)", selected)).size(12)].spacing(2);

    for section in sections {
        list = list.push(view_section(section));
    }

    list.into()
}

fn view_section(section: &KnownSection) -> Element<'static, Message> {
    let start = section.start_address;
    let range = match section.end_address {
        Some(end) => format!("{:#x} - {:#x}", start, end),
        None => format!("{:#x} - ?", start),
    };
    let status = if section.analyzed { "" } else { "  (not analyzed)" };

    // Selection only makes sense once the engine has analyzed the block
    let toggle = checkbox(section.selected)
        .label(format!("{}{}", range, status))
        .on_toggle_maybe(section.analyzed.then_some(move |_| Message::ToggleSection(start)))
        .text_size(11)
        .font(Font::MONOSPACE);

    row![toggle].align_y(Alignment::Center).into()
}

fn view_inspect(session: &SessionStore) -> Element<'_, Message> {
    let mut list = column![text("IR Inspect").size(12)].spacing(2);

    for item in session.inspect_result() {
        list = list.push(text(&item.instruction).size(11).font(Font::MONOSPACE));
        for statement in &item.statements {
            list = list.push(
                row![
                    Space::new().width(16),
                    text(&statement.statement).size(11).font(Font::MONOSPACE).color([0.4, 0.4, 0.4]),
                ],
            );
        }
    }

    list.into()
}

fn small_button(label: &'static str, message: Message) -> Element<'static, Message> {
    button(text(label).size(11))
        .on_press(message)
        .padding(Padding::from([4, 8]))
        .style(button::secondary)
        .into()
}
