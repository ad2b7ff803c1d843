//! Turns game state into coloured quads in world space, and maps between
//! world and screen coordinates.

use bytemuck::{Pod, Zeroable};

use crate::consts::{PIPE_WIDTH, WORLD_HEIGHT, WORLD_WIDTH};
use crate::game::Game;

/// One instanced rectangle, laid out for the vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub position: [f32; 2],
    pub size: [f32; 2],
    pub color: [f32; 4],
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Strict containment; points on the border are outside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.x + self.w && y > self.y && y < self.y + self.h
    }

    pub fn center(&self) -> [f32; 2] {
        [self.x + self.w * 0.5, self.y + self.h * 0.5]
    }
}

const BUTTON_WIDTH: f32 = 140.0;
const BUTTON_HEIGHT: f32 = 50.0;
const BUTTON_BORDER: f32 = 3.0;

/// Hit region of the restart button shown on the game-over overlay.
pub fn restart_button() -> Rect {
    Rect {
        x: WORLD_WIDTH * 0.5 - BUTTON_WIDTH * 0.5,
        y: WORLD_HEIGHT * 0.5 + 40.0,
        w: BUTTON_WIDTH,
        h: BUTTON_HEIGHT,
    }
}

/// World-space anchors for the overlay text, centred horizontally.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverlayLayout {
    pub title: [f32; 2],
    pub final_score: [f32; 2],
    pub button_label: [f32; 2],
}

pub fn overlay_layout() -> OverlayLayout {
    let cx = WORLD_WIDTH * 0.5;
    let cy = WORLD_HEIGHT * 0.5;
    OverlayLayout {
        title: [cx, cy - 55.0],
        final_score: [cx, cy - 5.0],
        button_label: restart_button().center(),
    }
}

#[derive(Clone, Debug)]
pub struct Palette {
    pub background: [f32; 3],
    pub bird: [f32; 4],
    pub bird_beak: [f32; 4],
    pub pipe: [f32; 4],
    pub overlay: [f32; 4],
    pub button: [f32; 4],
    pub button_border: [f32; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: [0.36, 0.72, 0.92],
            bird: srgb(0xf5, 0xc8, 0x42),
            bird_beak: srgb(0xe1, 0x4b, 0x23),
            pipe: srgb(0x00, 0x80, 0x00),
            overlay: [0.0, 0.0, 0.0, 0.5],
            button: srgb(0x00, 0xcc, 0xff),
            button_border: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

fn srgb(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

fn quad(position: [f32; 2], size: [f32; 2], color: [f32; 4]) -> InstanceData {
    InstanceData {
        position,
        size,
        color,
    }
}

/// Bird and pipes, in draw order.
pub fn world_instances(game: &Game, palette: &Palette) -> Vec<InstanceData> {
    let mut instances = Vec::with_capacity(2 + game.pipes().len() * 2);

    let bird = game.bird();
    let diameter = bird.radius * 2.0;
    instances.push(quad(
        [bird.left(), bird.top()],
        [diameter, diameter],
        palette.bird,
    ));
    instances.push(quad(
        [bird.right() - bird.radius * 0.5, bird.y - bird.radius * 0.25],
        [bird.radius * 0.75, bird.radius * 0.5],
        palette.bird_beak,
    ));

    for pipe in game.pipes().iter() {
        if pipe.top > 0.0 {
            instances.push(quad([pipe.x, 0.0], [PIPE_WIDTH, pipe.top], palette.pipe));
        }
        let bottom_h = WORLD_HEIGHT - pipe.bottom;
        if bottom_h > 0.0 {
            instances.push(quad(
                [pipe.x, pipe.bottom],
                [PIPE_WIDTH, bottom_h],
                palette.pipe,
            ));
        }
    }

    instances
}

/// Dimmed backdrop plus the bordered restart button.
pub fn overlay_instances(palette: &Palette) -> Vec<InstanceData> {
    let button = restart_button();
    // Stroke straddles the button edge like a canvas strokeRect.
    let half = BUTTON_BORDER * 0.5;
    let outer = Rect {
        x: button.x - half,
        y: button.y - half,
        w: button.w + BUTTON_BORDER,
        h: button.h + BUTTON_BORDER,
    };

    vec![
        quad([0.0, 0.0], [WORLD_WIDTH, WORLD_HEIGHT], palette.overlay),
        quad([button.x, button.y], [button.w, button.h], palette.button),
        quad([outer.x, outer.y], [outer.w, BUTTON_BORDER], palette.button_border),
        quad(
            [outer.x, outer.y + outer.h - BUTTON_BORDER],
            [outer.w, BUTTON_BORDER],
            palette.button_border,
        ),
        quad([outer.x, outer.y], [BUTTON_BORDER, outer.h], palette.button_border),
        quad(
            [outer.x + outer.w - BUTTON_BORDER, outer.y],
            [BUTTON_BORDER, outer.h],
            palette.button_border,
        ),
    ]
}

/// Uniform scale and centring offset that fit the world onto a screen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub offset: [f32; 2],
}

impl Letterbox {
    pub fn fit(screen_w: u32, screen_h: u32) -> Self {
        let scale_x = screen_w as f32 / WORLD_WIDTH;
        let scale_y = screen_h as f32 / WORLD_HEIGHT;
        let scale = scale_x.min(scale_y);
        let offset_x = (screen_w as f32 - WORLD_WIDTH * scale) * 0.5;
        let offset_y = (screen_h as f32 - WORLD_HEIGHT * scale) * 0.5;
        Self {
            scale,
            offset: [offset_x, offset_y],
        }
    }

    pub fn to_screen(&self, point: [f32; 2]) -> [f32; 2] {
        [
            point[0] * self.scale + self.offset[0],
            point[1] * self.scale + self.offset[1],
        ]
    }

    pub fn to_world(&self, point: [f32; 2]) -> [f32; 2] {
        let scale = self.scale.max(f32::EPSILON);
        [
            (point[0] - self.offset[0]) / scale,
            (point[1] - self.offset[1]) / scale,
        ]
    }

    pub fn apply(&self, instance: InstanceData) -> InstanceData {
        InstanceData {
            position: self.to_screen(instance.position),
            size: [instance.size[0] * self.scale, instance.size[1] * self.scale],
            color: instance.color,
        }
    }
}
