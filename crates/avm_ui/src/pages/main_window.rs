//! Main window view.
//!
//! One action button, the volume pick list, a status line and the list of
//! failed videos from the last batch.

use iced::alignment::Vertical;
use iced::widget::{button, column, container, pick_list, row, scrollable, text, Column};
use iced::{Element, Length};

use avm_core::merge::SUCCESS_MESSAGE;
use avm_core::models::VolumeScale;

use crate::app::{App, Message};
use crate::theme::{colors, font, spacing};

/// Build the main window view.
pub fn view(app: &App) -> Element<'_, Message> {
    let content = column![
        combine_button(app),
        volume_row(app),
        status_line(app),
        failure_section(app),
    ]
    .spacing(spacing::LG)
    .padding(spacing::XL);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn combine_button(app: &App) -> Element<'_, Message> {
    let label = if app.is_processing {
        "Combining..."
    } else {
        "Combine Audio with Videos"
    };

    button(text(label).size(font::LG))
        .on_press_maybe(app.can_combine().then_some(Message::CombinePressed))
        .padding([spacing::SM, spacing::XL])
        .into()
}

fn volume_row(app: &App) -> Element<'_, Message> {
    let picker = pick_list(
        VolumeScale::ALL,
        Some(app.selected_volume()),
        Message::VolumeSelected,
    )
    .text_size(font::NORMAL);

    row![text("Select Volume Scale:").size(font::NORMAL), picker]
        .spacing(spacing::SM)
        .align_y(Vertical::Center)
        .into()
}

fn status_line(app: &App) -> Element<'_, Message> {
    let status = text(&app.status_text).size(font::NORMAL);
    let status = if app.status_text == SUCCESS_MESSAGE {
        status.color(colors::SUCCESS)
    } else {
        status
    };

    match &app.log_path {
        Some(path) => column![
            status,
            text(format!("Log: {}", path.display()))
                .size(font::SM)
                .color(colors::TEXT_SECONDARY),
        ]
        .spacing(spacing::XS)
        .into(),
        None => status.into(),
    }
}

fn failure_section(app: &App) -> Element<'_, Message> {
    if app.failures.is_empty() {
        return Column::new().into();
    }

    let list = app.failures.iter().fold(
        Column::new().spacing(spacing::XS),
        |col, line| col.push(text(line).size(font::SM).color(colors::ERROR)),
    );

    column![
        text("Failed videos:").size(font::NORMAL),
        scrollable(list).height(Length::Fill),
    ]
    .spacing(spacing::XS)
    .into()
}
