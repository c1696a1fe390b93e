use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

/// Author picture stand-in: initials over the image reference.
pub struct AvatarWidget<'a> {
    name: &'a str,
    image: &'a str,
}

impl<'a> AvatarWidget<'a> {
    pub fn new(name: &'a str, image: &'a str) -> Self {
        Self { name, image }
    }
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

impl Widget for AvatarWidget<'_> {
    fn render(self, area: Rect, buffer: &mut Buffer) {
        let [picture, image] =
            Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(area);
        let block = Block::bordered().dim();
        let inner = block.inner(picture);
        block.render(picture, buffer);
        Line::from(initials(self.name))
            .bold()
            .centered()
            .render(inner, buffer);
        if !self.image.is_empty() {
            Paragraph::new(self.image)
                .dim()
                .wrap(Wrap { trim: true })
                .render(image, buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_of_names() {
        assert_eq!(initials("ada lovelace"), "AL");
        assert_eq!(initials("Grace Brewster Hopper"), "GB");
        assert_eq!(initials("  bob "), "B");
        assert_eq!(initials(""), "");
    }
}
