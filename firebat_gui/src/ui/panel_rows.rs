//! Panel Rows
//!
//! Renders every container of the layout as a horizontal row of panel
//! cards. Each card has a grab handle on top:
//! - idle: pressing a handle starts dragging that panel
//! - dragging: every other handle turns into a drop zone, the dragged
//!   panel's handle cancels, and each row gets an "end of row" drop zone

use iced::widget::{button, column, container, row, scrollable, text, Column, Row, Space};
use iced::{Element, Length, Padding};

use firebat_core::layout::{ContainerId, DropTarget, PanelId};

use super::{assembly_panel, ast_panel, ir_panel, section_panel};
use crate::{App, Message};

/// Render all rows, stacked vertically with equal heights
pub fn view_rows(app: &App) -> Element<'_, Message> {
    let dragging = app.bench.drag.active();
    let mut rows: Column<'_, Message> = column![].spacing(8).height(Length::Fill);

    for layout_row in app.bench.layout.rows() {
        rows = rows.push(view_row(app, &layout_row.id, &layout_row.panels, dragging));
    }

    rows.into()
}

fn view_row<'a>(
    app: &'a App,
    id: &ContainerId,
    panels: &[PanelId],
    dragging: Option<PanelId>,
) -> Element<'a, Message> {
    let mut cards: Row<'a, Message> = row![].spacing(8).height(Length::Fill);

    for &panel in panels {
        cards = cards.push(view_card(app, panel, dragging));
    }

    if panels.is_empty() && !app.bench.drag.is_dragging() {
        cards = cards.push(
            container(text("(empty row)").size(11).color([0.5, 0.5, 0.5]))
                .width(Length::Fill)
                .center_x(Length::Fill)
                .center_y(Length::Fill),
        );
    }

    if dragging.is_some() {
        cards = cards.push(
            button(
                container(text(format!("Drop at end of {}", id)).size(10))
                    .center_x(Length::Fill)
                    .center_y(Length::Fill),
            )
            .on_press(Message::Drop(DropTarget::Container(id.clone())))
            .width(if panels.is_empty() { Length::Fill } else { Length::Fixed(90.0) })
            .height(Length::Fill)
            .style(button::secondary),
        );
    }

    container(cards)
        .width(Length::Fill)
        .height(Length::FillPortion(1))
        .into()
}

fn view_card(app: &App, panel: PanelId, dragging: Option<PanelId>) -> Element<'_, Message> {
    let handle = match dragging {
        None => button(text(format!("⠿ {}", panel.title())).size(10))
            .on_press(Message::DragStart(panel))
            .style(button::secondary),
        Some(active) if active == panel => button(text(format!("⠿ {} (moving)", panel.title())).size(10))
            .on_press(Message::DragCancel)
            .style(button::primary),
        Some(_) => button(text(format!("Drop on {}", panel.title())).size(10))
            .on_press(Message::Drop(DropTarget::Panel(panel)))
            .style(button::success),
    }
    .padding(Padding::from([2, 8]))
    .width(Length::Fill);

    let body: Column<'_, Message> = match panel {
        PanelId::Sections => section_panel::view(app),
        PanelId::Assembly => assembly_panel::view(&app.bench.session),
        PanelId::Ir => ir_panel::view(&app.bench.session),
        PanelId::Ast => ast_panel::view(&app.bench.session),
    };

    container(column![
        handle,
        Space::new().height(4),
        container(scrollable(body.padding(8))).height(Length::Fill),
    ])
    .width(Length::FillPortion(1))
    .height(Length::Fill)
    .style(container::bordered_box)
    .padding(4)
    .into()
}
