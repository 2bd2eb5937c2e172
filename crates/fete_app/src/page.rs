//! The welcome page
//!
//! Static markup with a header logo, a short greeting, an empty form slot and
//! an illustration that hosts a [`ConfettiScreen`]. Sections are stacked top
//! to bottom in a centered column.

use fete_core::{ElementId, ElementTree, Rect};

use crate::context::MountContext;
use crate::screen::{ConfettiScreen, ConfettiScreenProps};

/// Pieces thrown when the page opens
pub const WELCOME_CONFETTI_AMOUNT: f32 = 300.0;

const COLUMN_WIDTH: f32 = 640.0;
const PAGE_PADDING: f32 = 32.0;
const SECTION_GAP: f32 = 24.0;
const LOGO: (f32, f32) = (100.0, 30.0);
const TITLE_HEIGHT: f32 = 40.0;
const PARAGRAPH_HEIGHT: f32 = 48.0;
const ILLUSTRATION: (f32, f32) = (500.0, 50.0);
const FOOTER_HEIGHT: f32 = 24.0;

const TITLE: &str = "Welcome!";

const PARAGRAPHS: [&str; 3] = [
    "Great to see you here. This environment is set up to ensure everything is working correctly before your technical interview.",
    "We'll send you a link to the technical challenge repository at the time of your interview, which uses the same packages as this sandbox.",
    "If you can see this page and the illustration below, your development environment is properly configured and you're all set!",
];

const FOOTER: &str = "© Tines";

/// Confetti settings the page uses unless overridden
pub fn welcome_confetti() -> ConfettiScreenProps {
    ConfettiScreenProps {
        should_start: true,
        amount: Some(WELCOME_CONFETTI_AMOUNT),
        ..Default::default()
    }
}

/// Top-down layout cursor inside the page column
struct Column {
    left: f32,
    width: f32,
    y: f32,
}

impl Column {
    fn take(&mut self, height: f32) -> Rect {
        let rect = Rect::new(self.left, self.y, self.width, height);
        self.y += height;
        rect
    }

    fn gap(&mut self) {
        self.y += SECTION_GAP;
    }
}

fn child(
    tree: &mut ElementTree,
    parent: ElementId,
    tag: &'static str,
    class: Option<&str>,
    bounds: Rect,
) -> ElementId {
    let id = tree.create_element(tag);
    if let Some(class) = class {
        tree.set_attribute(id, "class", class);
    }
    tree.set_bounds(id, bounds);
    tree.append_child(parent, id);
    id
}

fn image(tree: &mut ElementTree, parent: ElementId, src: &str, alt: &str, bounds: Rect) {
    let img = child(tree, parent, "img", None, bounds);
    tree.set_attribute(img, "src", src);
    tree.set_attribute(img, "alt", alt);
    tree.set_attribute(img, "width", format!("{}", bounds.width()));
    tree.set_attribute(img, "height", format!("{}", bounds.height()));
}

/// Handles to the page's sections
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSections {
    pub page: ElementId,
    pub layout: ElementId,
    pub header: ElementId,
    pub body: ElementId,
    pub form: ElementId,
    pub illustration: ElementId,
    pub footer: ElementId,
}

/// The welcome page component
#[derive(Debug)]
pub struct WelcomePage {
    ctx: Option<MountContext>,
    sections: Option<PageSections>,
    confetti: ConfettiScreen,
}

impl WelcomePage {
    pub fn new(confetti: ConfettiScreenProps) -> Self {
        Self {
            ctx: None,
            sections: None,
            confetti: ConfettiScreen::new(confetti),
        }
    }

    /// Build the page under the document root and mount its confetti
    pub fn mount(&mut self, ctx: &MountContext) -> PageSections {
        self.unmount();

        let sections = ctx.document.with_mut(|tree| {
            let root = tree.root();
            let viewport = tree.viewport();

            let page = child(tree, root, "div", Some("page"), viewport.to_rect());

            let width = COLUMN_WIDTH.min(viewport.width - 2.0 * PAGE_PADDING).max(0.0);
            let mut column = Column {
                left: ((viewport.width - width) / 2.0).max(0.0),
                width,
                y: PAGE_PADDING,
            };
            let layout_top = column.y;
            let layout = child(tree, page, "div", Some("pageLayout"), Rect::ZERO);

            let header_rect = column.take(LOGO.1);
            let header = child(tree, layout, "header", Some("pageHeader"), header_rect);
            let logo = Rect::new(header_rect.left(), header_rect.top(), LOGO.0, LOGO.1);
            image(tree, header, "/tines.svg", "tines", logo);
            column.gap();

            let body_height = TITLE_HEIGHT + PARAGRAPHS.len() as f32 * PARAGRAPH_HEIGHT;
            let body_rect = column.take(body_height);
            let body = child(tree, layout, "div", Some("body"), body_rect);
            let mut text = Column {
                left: body_rect.left(),
                width: body_rect.width(),
                y: body_rect.top(),
            };
            let title = child(tree, body, "h1", Some("pageTitle"), text.take(TITLE_HEIGHT));
            tree.set_text(title, TITLE);
            for paragraph in PARAGRAPHS {
                let p = child(tree, body, "p", None, text.take(PARAGRAPH_HEIGHT));
                tree.set_text(p, paragraph);
            }
            column.gap();

            let form = child(tree, layout, "div", Some("form"), column.take(0.0));
            column.gap();

            let illustration_rect = column.take(ILLUSTRATION.1);
            let illustration = child(tree, layout, "div", Some("illustration"), illustration_rect);
            let art = Rect::new(
                illustration_rect.left(),
                illustration_rect.top(),
                ILLUSTRATION.0.min(illustration_rect.width()),
                ILLUSTRATION.1,
            );
            image(tree, illustration, "/illustration.svg", "illustration", art);
            column.gap();

            let footer = child(tree, layout, "footer", Some("footer"), column.take(FOOTER_HEIGHT));
            tree.set_text(footer, FOOTER);

            tree.set_bounds(
                layout,
                Rect::new(column.left, layout_top, column.width, column.y - layout_top),
            );

            PageSections {
                page,
                layout,
                header,
                body,
                form,
                illustration,
                footer,
            }
        });

        self.confetti.mount(ctx, sections.illustration);
        self.ctx = Some(ctx.clone());
        self.sections = Some(sections);
        tracing::debug!("WelcomePage: mounted");
        sections
    }

    /// Forward burst state changes to the page's markup
    pub fn sync(&mut self) -> bool {
        self.confetti.sync()
    }

    /// Remove the page and cancel its confetti
    pub fn unmount(&mut self) {
        self.confetti.unmount();
        if let (Some(sections), Some(ctx)) = (self.sections.take(), self.ctx.take()) {
            ctx.document.with_mut(|tree| tree.destroy(sections.page));
        }
    }

    pub fn sections(&self) -> Option<PageSections> {
        self.sections
    }

    pub fn confetti(&self) -> &ConfettiScreen {
        &self.confetti
    }
}

impl Default for WelcomePage {
    fn default() -> Self {
        Self::new(welcome_confetti())
    }
}
