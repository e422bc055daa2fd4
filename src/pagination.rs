use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::domain::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    Previous,
    Page(usize),
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControl {
    pub target: PageTarget,
    pub label: String,
    pub active: bool,
    pub disabled: bool,
}

impl PageControl {
    /// Disabled controls are inert, which is what keeps the page in range.
    pub fn activate(&self) -> Option<Message> {
        if self.disabled {
            return None;
        }
        Some(match self.target {
            PageTarget::Previous => Message::PreviousPage,
            PageTarget::Page(page) => Message::GoToPage(page),
            PageTarget::Next => Message::NextPage,
        })
    }

    /// Page number after activating this control on `current`.
    pub fn apply(&self, current: usize) -> usize {
        match self.target {
            PageTarget::Previous => current.saturating_sub(1),
            PageTarget::Page(page) => page,
            PageTarget::Next => current + 1,
        }
    }

    fn width(&self) -> usize {
        self.label.chars().count() + 2
    }
}

pub fn page_controls(current_page: usize, total_pages: usize) -> Vec<PageControl> {
    let mut controls = Vec::with_capacity(total_pages + 2);
    controls.push(PageControl {
        target: PageTarget::Previous,
        label: "‹ Prev".to_string(),
        active: false,
        disabled: current_page == 1,
    });
    controls.extend((1..=total_pages).map(|page| PageControl {
        target: PageTarget::Page(page),
        label: page.to_string(),
        active: page == current_page,
        disabled: false,
    }));
    controls.push(PageControl {
        target: PageTarget::Next,
        label: "Next ›".to_string(),
        active: false,
        disabled: total_pages == 0 || current_page == total_pages,
    });
    controls
}

/// One position on the pagination line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Index into the control list.
    Control(usize),
    /// Collapsed run of page buttons.
    Gap,
}

const GAP: &str = "…";

fn slot_width(controls: &[PageControl], slot: Slot) -> usize {
    match slot {
        Slot::Control(idx) => controls[idx].width(),
        Slot::Gap => GAP.chars().count(),
    }
}

fn line_width(controls: &[PageControl], slots: &[Slot]) -> usize {
    slots
        .iter()
        .map(|slot| slot_width(controls, *slot) + 1)
        .sum::<usize>()
        .saturating_sub(1)
}

/// Prev, Next, the first, last and active page are always shown. Pages around
/// the active one are added while the line fits `width`, the others collapse
/// into gaps.
pub fn visible_slots(controls: &[PageControl], width: usize) -> Vec<Slot> {
    let all: Vec<Slot> = (0..controls.len()).map(Slot::Control).collect();
    if controls.len() <= 2 || line_width(controls, &all) <= width {
        return all;
    }
    // Page n sits at index n, between Prev and Next
    let last_page = controls.len() - 2;
    let active = controls
        .iter()
        .position(|c| c.active)
        .unwrap_or(1)
        .clamp(1, last_page);
    let mut slots = page_window(last_page, active, 0);
    for radius in 1..last_page {
        let candidate = page_window(last_page, active, radius);
        if line_width(controls, &candidate) > width {
            break;
        }
        slots = candidate;
    }
    slots
}

fn page_window(last_page: usize, active: usize, radius: usize) -> Vec<Slot> {
    let low = active.saturating_sub(radius).max(1);
    let high = std::cmp::min(active + radius, last_page);
    let mut pages = vec![1];
    pages.extend(low..=high);
    pages.push(last_page);
    pages.dedup();

    let mut slots = vec![Slot::Control(0)];
    let mut previous = 0;
    for page in pages {
        if page > previous + 1 {
            slots.push(Slot::Gap);
        }
        slots.push(Slot::Control(page));
        previous = page;
    }
    slots.push(Slot::Control(last_page + 1));
    slots
}

/// Centered areas of the visible slots on a single line. Only a line too
/// narrow for even the reduced set loses slots at its end.
pub fn slot_areas(controls: &[PageControl], area: Rect) -> Vec<(Rect, Slot)> {
    let slots = visible_slots(controls, area.width as usize);
    let needed = line_width(controls, &slots);
    let right = area.right() as usize;
    let mut x = area.x as usize + (area.width as usize).saturating_sub(needed) / 2;
    let mut areas = Vec::with_capacity(slots.len());
    for slot in slots {
        let width = slot_width(controls, slot);
        if x + width > right {
            break;
        }
        areas.push((Rect::new(x as u16, area.y, width as u16, 1), slot));
        x += width + 1;
    }
    areas
}

/// Areas of the clickable controls, as indexes into `controls`.
pub fn control_areas(controls: &[PageControl], area: Rect) -> Vec<(Rect, usize)> {
    slot_areas(controls, area)
        .into_iter()
        .filter_map(|(rect, slot)| match slot {
            Slot::Control(idx) => Some((rect, idx)),
            Slot::Gap => None,
        })
        .collect()
}

pub struct Pagination<'a> {
    pub controls: &'a [PageControl],
}

impl Widget for Pagination<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        for (rect, slot) in slot_areas(self.controls, area) {
            let Slot::Control(idx) = slot else {
                buf.set_string(rect.x, rect.y, GAP, Style::new().fg(Color::DarkGray));
                continue;
            };
            let control = &self.controls[idx];
            let style = if control.disabled {
                Style::new().fg(Color::DarkGray)
            } else if control.active {
                Style::new()
                    .fg(Color::Black)
                    .bg(Color::LightBlue)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::new().fg(Color::LightBlue)
            };
            buf.set_stringn(
                rect.x,
                rect.y,
                format!(" {} ", control.label),
                rect.width as usize,
                style,
            );
        }
    }
}
