//! IR Panel
//!
//! IR statements tinted with the color of the instruction they were lifted
//! from. Hovering a statement highlights that instruction everywhere.

use iced::widget::{column, text, Column, Space};

use firebat_core::session::SessionStore;

use super::shared::{code_line, placeholder};
use crate::Message;

pub fn view(session: &SessionStore) -> Column<'_, Message> {
    let content = column![text("IR Panel").size(14), Space::new().height(8)];

    let Some(decompilation) = session.decompilation().filter(|d| !d.data.ir.is_empty()) else {
        return content.push(placeholder(
            "No IR data available. Please select sections and run decompilation.",
        ));
    };

    let list = decompilation.data.ir.iter().fold(column![].spacing(4), |list, line| {
        let index = line.parents_assembly_index;
        list.push(code_line(
            &line.data,
            decompilation.color(index),
            index,
            session.is_highlighted(index),
        ))
    });

    content.push(list)
}
