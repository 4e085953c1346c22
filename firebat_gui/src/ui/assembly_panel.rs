//! Assembly Panel
//!
//! One tinted line per decompiled instruction.

use iced::widget::{column, text, Column, Space};

use firebat_core::session::SessionStore;

use super::shared::{code_line, placeholder};
use crate::Message;

pub fn view(session: &SessionStore) -> Column<'_, Message> {
    let content = column![text("Assembly Panel").size(14), Space::new().height(8)];

    let lines = session
        .decompilation()
        .filter(|d| !d.data.assembly.is_empty());

    let Some(decompilation) = lines else {
        return content.push(placeholder(
            "No assembly data available. Please select sections and run decompilation.",
        ));
    };

    let mut list = column![].spacing(4);
    for line in &decompilation.data.assembly {
        list = list.push(code_line(
            &line.data,
            decompilation.color(line.index),
            line.index,
            session.is_highlighted(line.index),
        ));
    }

    content.push(list)
}
