use crate::backend::types::LinkPreview;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Stylize};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

pub struct LinkPreviewWidget<'a> {
    preview: &'a LinkPreview,
}

impl<'a> LinkPreviewWidget<'a> {
    pub fn new(preview: &'a LinkPreview) -> Self {
        Self { preview }
    }
}

impl Widget for LinkPreviewWidget<'_> {
    fn render(self, area: Rect, buffer: &mut Buffer) {
        let block = Block::bordered()
            .border_style(Color::DarkGray)
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        block.render(area, buffer);

        let image_width = if self.preview.image.is_empty() { 0 } else { 16 };
        let [description, image] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(image_width)])
                .spacing(1)
                .areas(inner);
        Paragraph::new(Text::from(vec![
            Line::from(self.preview.title.as_str()).bold(),
            Line::from(self.preview.description.as_str()).gray(),
            Line::from(Span::from(self.preview.link.as_str()).underlined()),
        ]))
        .wrap(Wrap { trim: true })
        .render(description, buffer);
        if image_width > 0 {
            Paragraph::new(Text::from(vec![
                Line::from("image").yellow(),
                Line::from(self.preview.image.as_str()).dim(),
            ]))
            .wrap(Wrap { trim: true })
            .render(image, buffer);
        }
    }
}
