use indexmap::IndexMap;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;

use std::collections::HashSet;
use std::path::Path;

use log::*;

use crate::chart::render_failure;
use crate::config::WordCloudConfig;
use crate::stopwords::default_stopwords;
use crate::Error;

/// Layout grid resolution in pixels
const CELL: u32 = 4;
const MARGIN: u32 = 2;
/// Average glyph advance as a fraction of the font size
const CHAR_WIDTH: f64 = 0.6;
const PREFER_HORIZONTAL: f64 = 0.9;
const RELATIVE_SCALING: f64 = 0.5;

const PALETTE: [RGBColor; 10] = [
    RGBColor(68, 1, 84),
    RGBColor(72, 40, 120),
    RGBColor(62, 74, 137),
    RGBColor(49, 104, 142),
    RGBColor(38, 130, 142),
    RGBColor(31, 158, 137),
    RGBColor(53, 183, 121),
    RGBColor(109, 205, 89),
    RGBColor(180, 222, 44),
    RGBColor(253, 231, 37),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coloring {
    /// A random palette colour per word
    Palette,
    /// Every word the same colour
    Flat(RGBColor),
}

pub struct WordCloud {
    width: u32,
    height: u32,
    max_words: usize,
    min_font_size: u32,
    max_font_size: u32,
    seed: Option<u64>,
    background: RGBColor,
    coloring: Coloring,
    stopwords: HashSet<String>,
    word_re: Regex,
}

impl WordCloud {
    pub fn new(config: &WordCloudConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            max_words: config.max_words,
            min_font_size: config.min_font_size,
            max_font_size: config.effective_max_font_size(),
            seed: config.seed,
            background: WHITE,
            coloring: Coloring::Palette,
            stopwords: default_stopwords(),
            word_re: Regex::new(r"\w[\w']*").expect("word pattern is valid"),
        }
    }

    pub fn with_coloring(mut self, coloring: Coloring) -> Self {
        self.coloring = coloring;
        self
    }

    /// Word counts, most frequent first
    ///
    /// Stopwords, bare numbers and a trailing `'s` are dropped. Spellings that
    /// differ only in case count as one word shown in its most common form,
    /// and a plural is folded into its singular when both occur.
    pub fn frequencies(&self, text: &str) -> Vec<(String, usize)> {
        let mut spellings: IndexMap<String, IndexMap<&str, usize>> = IndexMap::new();
        for token in self.word_re.find_iter(text).map(|m| m.as_str()) {
            let token = token
                .strip_suffix("'s")
                .or_else(|| token.strip_suffix("'S"))
                .unwrap_or(token);
            if token.chars().all(char::is_numeric) {
                continue;
            }
            let lower = token.to_lowercase();
            if self.stopwords.contains(&lower) {
                continue;
            }
            *spellings
                .entry(lower)
                .or_default()
                .entry(token)
                .or_insert(0) += 1;
        }

        let mut counts: IndexMap<String, (String, usize)> = spellings
            .into_iter()
            .map(|(lower, forms)| {
                let mut best = ("", 0);
                for (form, count) in &forms {
                    if *count > best.1 {
                        best = (*form, *count);
                    }
                }
                let total: usize = forms.values().sum();
                (lower, (best.0.to_string(), total))
            })
            .collect();

        let plurals: Vec<String> = counts
            .keys()
            .filter(|word| word.ends_with('s') && !word.ends_with("ss"))
            .filter(|word| counts.contains_key(&word[..word.len() - 1]))
            .cloned()
            .collect();
        for plural in plurals {
            if let Some((_, count)) = counts.shift_remove(&plural) {
                if let Some(singular) = counts.get_mut(&plural[..plural.len() - 1]) {
                    singular.1 += count;
                }
            }
        }

        let mut words: Vec<(String, usize)> = counts.into_iter().map(|(_, word)| word).collect();
        words.sort_by(|a, b| b.1.cmp(&a.1));
        words.truncate(self.max_words);
        words
    }

    /// Lays out `text`, or `None` when no word survives filtering
    pub fn generate(&self, text: &str) -> Option<WordLayout> {
        let words = self.frequencies(text);
        let max_count = words.first()?.1 as f64;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut canvas = Occupancy::new(self.width, self.height);
        let mut placed = vec![];
        let mut font_size = self.max_font_size;
        let mut last_freq = 1.0;

        for (i, (word, count)) in words.iter().enumerate() {
            let freq = *count as f64 / max_count;
            if i > 0 {
                font_size = ((RELATIVE_SCALING * (freq / last_freq) + (1.0 - RELATIVE_SCALING))
                    * font_size as f64)
                    .round() as u32;
            }

            let vertical_first = !rng.gen_bool(PREFER_HORIZONTAL);
            let mut spot = None;
            while font_size >= self.min_font_size {
                for &vertical in &[vertical_first, !vertical_first] {
                    let (width, height) = box_size(word, font_size, vertical);
                    if let Some((x, y)) = canvas.find_spot(width, height, &mut rng) {
                        spot = Some((x, y, width, height, vertical));
                        break;
                    }
                }
                if spot.is_some() {
                    break;
                }
                font_size -= 1;
            }

            // Out of room, smaller words won't fit either
            let (x, y, width, height, vertical) = match spot {
                Some(spot) => spot,
                None => break,
            };
            canvas.occupy(x, y, width, height);

            let color = match self.coloring {
                Coloring::Palette => PALETTE[rng.gen_range(0..PALETTE.len())],
                Coloring::Flat(color) => color,
            };
            placed.push(PlacedWord {
                text: word.clone(),
                font_size,
                x,
                y,
                width,
                height,
                vertical,
                color,
            });
            last_freq = freq;
        }
        debug!("Wordcloud: Placed {} of {} words", placed.len(), words.len());

        Some(WordLayout {
            width: self.width,
            height: self.height,
            background: self.background,
            words: placed,
        })
    }
}

fn box_size(word: &str, font_size: u32, vertical: bool) -> (u32, u32) {
    let length =
        (word.chars().count() as f64 * font_size as f64 * CHAR_WIDTH).ceil() as u32 + 2 * MARGIN;
    let thickness = font_size + 2 * MARGIN;
    if vertical {
        (thickness, length)
    } else {
        (length, thickness)
    }
}

/// Coarse grid of taken cells with a summed-area table for box queries
struct Occupancy {
    cols: usize,
    rows: usize,
    cells: Vec<bool>,
    integral: Vec<u32>,
}

impl Occupancy {
    fn new(width: u32, height: u32) -> Self {
        let cols = (width / CELL) as usize;
        let rows = (height / CELL) as usize;
        Self {
            cols,
            rows,
            cells: vec![false; cols * rows],
            integral: vec![0; (cols + 1) * (rows + 1)],
        }
    }

    fn cells_for(pixels: u32) -> usize {
        ((pixels + CELL - 1) / CELL) as usize
    }

    fn taken(&self, col: usize, row: usize, w: usize, h: usize) -> u32 {
        let stride = self.cols + 1;
        let at = |c: usize, r: usize| self.integral[r * stride + c];
        (at(col + w, row + h) + at(col, row)) - (at(col + w, row) + at(col, row + h))
    }

    /// A uniformly random free top-left corner for a box of the given size
    fn find_spot(&self, width: u32, height: u32, rng: &mut StdRng) -> Option<(u32, u32)> {
        let (w, h) = (Self::cells_for(width), Self::cells_for(height));
        if w > self.cols || h > self.rows {
            return None;
        }
        let free = |col: usize, row: usize| self.taken(col, row, w, h) == 0;
        let positions = move || {
            (0..=self.rows - h).flat_map(move |row| (0..=self.cols - w).map(move |col| (col, row)))
        };

        let hits = positions().filter(|&(col, row)| free(col, row)).count();
        if hits == 0 {
            return None;
        }
        let target = rng.gen_range(0..hits);
        positions()
            .filter(|&(col, row)| free(col, row))
            .nth(target)
            .map(|(col, row)| (col as u32 * CELL, row as u32 * CELL))
    }

    fn occupy(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let (col, row) = ((x / CELL) as usize, (y / CELL) as usize);
        let (w, h) = (Self::cells_for(width), Self::cells_for(height));
        for r in row..(row + h).min(self.rows) {
            for c in col..(col + w).min(self.cols) {
                self.cells[r * self.cols + c] = true;
            }
        }

        let stride = self.cols + 1;
        for r in 0..self.rows {
            let mut row_sum = 0;
            for c in 0..self.cols {
                row_sum += self.cells[r * self.cols + c] as u32;
                self.integral[(r + 1) * stride + c + 1] = self.integral[r * stride + c + 1] + row_sum;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: u32,
    /// Top-left corner of the word's box
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub vertical: bool,
    pub color: RGBColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordLayout {
    width: u32,
    height: u32,
    background: RGBColor,
    words: Vec<PlacedWord>,
}

impl WordLayout {
    pub fn words(&self) -> &[PlacedWord] {
        &self.words
    }

    pub fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&self.background)?;
        for word in &self.words {
            let style = ("sans-serif", word.font_size as f64)
                .into_font()
                .color(&word.color);
            let (x, y) = ((word.x + MARGIN) as i32, (word.y + MARGIN) as i32);
            if word.vertical {
                let baseline = (word.y + word.height - MARGIN) as i32;
                root.draw(&Text::new(
                    word.text.as_str(),
                    (x, baseline),
                    style.transform(FontTransform::Rotate270),
                ))?;
            } else {
                root.draw(&Text::new(word.text.as_str(), (x, y), style))?;
            }
        }
        root.present()
    }

    pub fn to_svg(&self) -> Result<String, Error> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            self.draw(&root).map_err(render_failure)?;
        }
        Ok(svg)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_svg()?)?;
        debug!(
            "Wordcloud: Wrote {} words to {}",
            self.words().len(),
            path.display()
        );
        Ok(())
    }
}
