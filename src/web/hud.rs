use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlDivElement};

const ROOT_STYLE: &str = "position:fixed;top:16px;left:16px;color:#ffcc00;font-family:'Comic Sans MS',Arial,sans-serif;font-size:24px;font-weight:bold;pointer-events:none;text-shadow:0 0 6px rgba(0,0,0,0.45);z-index:1000;";
const LABEL_STYLE: &str = "position:fixed;transform:translate(-50%,-50%);white-space:nowrap;font-weight:bold;pointer-events:none;z-index:1001;";

/// A screen position (CSS pixels) and the world-to-screen scale for sizing text.
#[derive(Copy, Clone, Debug)]
pub struct Anchor {
    pub left: f32,
    pub top: f32,
    pub scale: f32,
}

/// Where the game-over texts go on the page.
#[derive(Copy, Clone, Debug)]
pub struct OverlayAnchors {
    pub title: Anchor,
    pub final_score: Anchor,
    pub button_label: Anchor,
}

/// DOM text drawn over the canvas: score, FPS and the game-over labels.
#[derive(Clone)]
pub struct Hud {
    score: HtmlDivElement,
    fps: HtmlDivElement,
    title: HtmlDivElement,
    final_score: HtmlDivElement,
    button_label: HtmlDivElement,
}

impl Hud {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let root = create_div(document)?;
        root.set_class_name("hud-root");
        set_style(&root, ROOT_STYLE);

        let score = create_div(document)?;
        score.set_class_name("hud-score");
        score.set_inner_text("Score: 0");
        set_style(&score, "margin-bottom:4px;");

        let fps = create_div(document)?;
        fps.set_inner_text("FPS: --");
        set_style(&fps, "font-size:12px;color:white;font-family:'Inter',sans-serif;");

        root.append_child(&score)?;
        root.append_child(&fps)?;
        body.append_child(&root)?;

        let title = create_div(document)?;
        title.set_inner_text("Game Over");
        let final_score = create_div(document)?;
        let button_label = create_div(document)?;
        button_label.set_inner_text("Restart");
        for label in [&title, &final_score, &button_label] {
            set_style(label, &format!("{LABEL_STYLE}display:none;"));
            body.append_child(label)?;
        }

        Ok(Self {
            score,
            fps,
            title,
            final_score,
            button_label,
        })
    }

    pub fn set_fps(&self, fps: f32) {
        self.fps
            .set_inner_text(&format!("FPS: {:>3.0}", fps.round().clamp(0.0, 999.0)));
    }

    pub fn set_score(&self, score: u32, best: u32) {
        if best > 0 {
            self.score
                .set_inner_text(&format!("Score: {}  (best {})", score, best));
        } else {
            self.score.set_inner_text(&format!("Score: {}", score));
        }
    }

    pub fn show_game_over(&self, score: u32, anchors: &OverlayAnchors) {
        self.final_score
            .set_inner_text(&format!("Final Score: {}", score));
        place(&self.title, anchors.title, "#ff4444", 50.0);
        place(&self.final_score, anchors.final_score, "#ffffff", 25.0);
        place(&self.button_label, anchors.button_label, "#ffffff", 22.0);
    }

    pub fn hide_game_over(&self) {
        for label in [&self.title, &self.final_score, &self.button_label] {
            set_style(label, &format!("{LABEL_STYLE}display:none;"));
        }
    }

    pub fn set_error(&self, text: &str) {
        self.score.set_inner_text(text);
        set_style(
            &self.score,
            "color:#ff8080;font-size:16px;font-weight:600;max-width:320px;line-height:1.4;",
        );
    }
}

fn create_div(document: &Document) -> Result<HtmlDivElement, JsValue> {
    document
        .create_element("div")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("failed to create hud element"))
}

fn place(label: &HtmlDivElement, anchor: Anchor, color: &str, font_px: f32) {
    set_style(
        label,
        &format!(
            "{LABEL_STYLE}display:block;left:{:.1}px;top:{:.1}px;color:{color};font-size:{:.1}px;font-family:Arial,sans-serif;",
            anchor.left,
            anchor.top,
            font_px * anchor.scale,
        ),
    );
}

fn set_style(element: &HtmlDivElement, css: &str) {
    element.style().set_css_text(css);
}
