//! Request menu layout.
//!
//! Buttons are grouped by colour (primary, then success, then everything
//! else) and each group is split into rows of at most five.

use crate::domain::{Action, ButtonStyle};

pub const MAX_BUTTONS_PER_ROW: usize = 5;

fn group(style: ButtonStyle) -> u8 {
    match style {
        ButtonStyle::Primary => 0,
        ButtonStyle::Success => 1,
        ButtonStyle::Secondary | ButtonStyle::Link | ButtonStyle::Danger => 2,
    }
}

/// Rows of menu buttons, each row becoming one message.
pub fn button_rows(buttons: impl IntoIterator<Item = Action>) -> Vec<Vec<Action>> {
    let mut groups: [Vec<Action>; 3] = Default::default();
    for button in buttons {
        groups[usize::from(group(button.style))].push(button);
    }
    groups
        .iter()
        .flat_map(|g| g.chunks(MAX_BUTTONS_PER_ROW).map(<[Action]>::to_vec))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(n: usize, style: ButtonStyle) -> Action {
        Action::new(format!("b{n}"), style, format!("f{n}:open"))
    }

    #[test]
    fn primary_first_then_success_then_the_rest() {
        let rows = button_rows([
            button(0, ButtonStyle::Danger),
            button(1, ButtonStyle::Success),
            button(2, ButtonStyle::Primary),
        ]);
        let labels: Vec<Vec<String>> = rows
            .iter()
            .map(|row| row.iter().map(|b| b.label.clone()).collect())
            .collect();
        assert_eq!(labels, [["b2"], ["b1"], ["b0"]]);
    }

    #[test]
    fn rows_hold_at_most_five() {
        let rows = button_rows((0..7).map(|n| button(n, ButtonStyle::Primary)));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 5);
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn no_buttons_no_rows() {
        assert!(button_rows(Vec::new()).is_empty());
    }
}
