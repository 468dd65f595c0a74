use smallvec::SmallVec;

use crate::error::BreakError;
use crate::item::{has_terminator, Item};

/// Breaking policy for one paragraph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreakerConfig {
    /// Target line width, in the width oracle's units.
    pub width: f32,
    /// Maximum adjustment ratio a candidate line may stretch to.
    pub threshold: f32,
    /// Extra demerits when consecutive lines both end at flagged penalties.
    pub flagged_penalty: f32,
    /// Extra demerits when consecutive lines differ by more than one
    /// fitness class.
    pub fitness_penalty: f32,
    /// Dominance pruning margin: a per-round candidate whose demerits exceed
    /// the round minimum by more than this is dropped. `+inf` disables.
    pub dominance_margin: f32,
}

impl BreakerConfig {
    /// Convenience for a target width with default tuning.
    pub fn for_width(width: f32) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            width: 0.0,
            threshold: 5.0,
            flagged_penalty: 3000.0,
            fitness_penalty: 100.0,
            dominance_margin: f32::INFINITY,
        }
    }
}

/// One break in the optimal chain.
///
/// `position` indexes the stream item the line breaks at; the starting
/// sentinel carries -1. After optimization, breaks at penalty items are
/// advanced by one so a taken hyphen stays on the line it ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Breakpoint {
    pub position: isize,
    /// 1-based number of the line this break ends; 0 for the sentinel.
    pub line: usize,
    /// Fitness class of that line: 0 tight, 1 normal, 2 loose, 3 very loose.
    pub fitness_class: u8,
    /// Adjustment ratio of that line.
    pub ratio: f32,
    /// Demerits of the best chain ending here.
    pub total_demerits: f64,
    pub total_width: f32,
    pub total_stretch: f32,
    pub total_shrink: f32,
    /// Index of the break this one extends: the predecessor's position in a
    /// returned chain, `None` for the sentinel.
    pub previous: Option<usize>,
}

/// One assembled line: its stream slice and the break that ends it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line<'a> {
    pub items: &'a [Item],
    pub breakpoint: Breakpoint,
}

/// Counters from one breaker invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BreakSummary {
    pub legal_breakpoints: usize,
    pub nodes_created: usize,
    pub nodes_deactivated: usize,
    pub peak_active: usize,
}

#[derive(Clone, Copy, Debug, Default)]
struct RunningSums {
    width: f32,
    stretch: f32,
    shrink: f32,
}

#[derive(Clone, Copy)]
struct Candidate {
    previous: usize,
    total_demerits: f64,
    ratio: f32,
}

/// Knuth-Plass total-fit breakpoint optimizer.
///
/// One invocation owns its node arena and active list exclusively; the
/// breaker itself is stateless between calls and safe to share across
/// threads for independent paragraphs.
#[derive(Clone, Copy, Debug)]
pub struct ParagraphBreaker {
    cfg: BreakerConfig,
}

impl ParagraphBreaker {
    pub fn new(cfg: BreakerConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.cfg
    }

    /// Compute the optimal break chain for `stream`.
    ///
    /// The first entry is the starting sentinel (position -1, line 0); the
    /// last is the forced final break. Breaks at penalty items have their
    /// position advanced by one past the penalty.
    pub fn optimum_breakpoints(&self, stream: &[Item]) -> Result<Vec<Breakpoint>, BreakError> {
        self.optimum_breakpoints_with_summary(stream)
            .map(|(chain, _)| chain)
    }

    /// Like [`optimum_breakpoints`](Self::optimum_breakpoints), also
    /// reporting sweep counters.
    pub fn optimum_breakpoints_with_summary(
        &self,
        stream: &[Item],
    ) -> Result<(Vec<Breakpoint>, BreakSummary), BreakError> {
        if !has_terminator(stream) {
            return Err(BreakError::MissingTerminator);
        }

        let mut summary = BreakSummary::default();
        let mut arena: Vec<Breakpoint> = Vec::with_capacity(stream.len() / 2 + 1);
        arena.push(Breakpoint {
            position: -1,
            line: 0,
            fitness_class: 1,
            ratio: 0.0,
            total_demerits: 0.0,
            total_width: 0.0,
            total_stretch: 0.0,
            total_shrink: 0.0,
            previous: None,
        });
        let mut active: Vec<usize> = vec![0];
        summary.peak_active = 1;

        let mut sums = RunningSums::default();
        for (index, item) in stream.iter().enumerate() {
            match item {
                Item::Box { width, .. } => sums.width += width,
                Item::Glue {
                    width,
                    stretch,
                    shrink,
                } => {
                    if index > 0 && stream[index - 1].is_box() {
                        self.scan_breakpoint(
                            stream,
                            index,
                            &sums,
                            &mut arena,
                            &mut active,
                            &mut summary,
                        )?;
                    }
                    sums.width += width;
                    sums.stretch += stretch;
                    sums.shrink += shrink;
                }
                Item::Penalty { penalty, .. } => {
                    if *penalty < f32::INFINITY {
                        self.scan_breakpoint(
                            stream,
                            index,
                            &sums,
                            &mut arena,
                            &mut active,
                            &mut summary,
                        )?;
                    }
                }
            }
        }

        // Every survivor ends at the forced final break; pick the cheapest,
        // breaking ties toward fewer lines, then the earlier position.
        let mut chosen: Option<usize> = None;
        for &index in &active {
            let node = &arena[index];
            let better = match chosen {
                None => true,
                Some(best) => {
                    let best = &arena[best];
                    node.total_demerits < best.total_demerits
                        || (node.total_demerits == best.total_demerits
                            && (node.line < best.line
                                || (node.line == best.line && node.position < best.position)))
                }
            };
            if better {
                chosen = Some(index);
            }
        }
        let Some(chosen) = chosen else {
            return Err(BreakError::NoFeasibleSolution {
                position: stream.len() - 1,
                threshold: self.cfg.threshold,
            });
        };

        let mut chain = Vec::with_capacity(arena[chosen].line + 1);
        let mut cursor = Some(chosen);
        while let Some(index) = cursor {
            chain.push(arena[index]);
            cursor = arena[index].previous;
        }
        chain.reverse();

        // Arena indices die with this call; re-point each break at its chain
        // predecessor and move penalty breaks past their penalty item.
        for (index, breakpoint) in chain.iter_mut().enumerate() {
            breakpoint.previous = index.checked_sub(1);
            if index > 0 && stream[breakpoint.position as usize].is_penalty() {
                breakpoint.position += 1;
            }
        }
        Ok((chain, summary))
    }

    /// Break `stream` and hand back the per-line item slices.
    ///
    /// A line starts at the first box or forced penalty at or after the
    /// previous break, so break glue is consumed by the break while a taken
    /// hyphen penalty stays on the line it ends. The final line keeps the
    /// terminator items.
    pub fn lines<'a>(&self, stream: &'a [Item]) -> Result<Vec<Line<'a>>, BreakError> {
        let chain = self.optimum_breakpoints(stream)?;
        let mut lines = Vec::with_capacity(chain.len().saturating_sub(1));
        let mut start = 0usize;
        for breakpoint in chain.into_iter().skip(1) {
            let end = breakpoint.position as usize;
            while start < end && !stream[start].is_box() && !stream[start].is_forced_break() {
                start += 1;
            }
            lines.push(Line {
                items: &stream[start..end],
                breakpoint,
            });
            start = end;
        }
        Ok(lines)
    }

    /// Evaluate one legal breakpoint against the active frontier.
    fn scan_breakpoint(
        &self,
        stream: &[Item],
        b_index: usize,
        sums: &RunningSums,
        arena: &mut Vec<Breakpoint>,
        active: &mut Vec<usize>,
        summary: &mut BreakSummary,
    ) -> Result<(), BreakError> {
        summary.legal_breakpoints += 1;
        if active.is_empty() {
            return Err(BreakError::NoFeasibleSolution {
                position: b_index,
                threshold: self.cfg.threshold,
            });
        }

        let forced = stream[b_index].is_forced_break();
        let final_position = (stream.len() - 1) as isize;
        let after = sums_after(stream, b_index, sums);
        let mut cursor = 0usize;
        while cursor < active.len() {
            // One pass per line group: actives sharing a line number.
            let group_line = arena[active[cursor]].line + 1;
            let mut best: [Option<Candidate>; 4] = [None; 4];
            while cursor < active.len() && arena[active[cursor]].line < group_line {
                let a_index = active[cursor];
                let a = arena[a_index];

                let ratio = self.adjustment_ratio(stream, &a, b_index, sums);
                if ratio < -1.0 || (forced && a.position != final_position) {
                    // Out of the frontier, but still in the arena: surviving
                    // chains may run through it.
                    active.remove(cursor);
                    summary.nodes_deactivated += 1;
                } else {
                    cursor += 1;
                }

                if ratio >= -1.0 && ratio <= self.cfg.threshold {
                    let demerits = a.total_demerits + self.demerits(stream, &a, b_index, ratio);
                    let class = fitness_class(ratio);
                    let slot = &mut best[class as usize];
                    let improves = match slot {
                        None => true,
                        Some(current) => demerits < current.total_demerits,
                    };
                    if improves {
                        *slot = Some(Candidate {
                            previous: a_index,
                            total_demerits: demerits,
                            ratio,
                        });
                    }
                }
            }

            if best.iter().any(Option::is_some) {
                let floor = best
                    .iter()
                    .flatten()
                    .map(|candidate| candidate.total_demerits)
                    .fold(f64::INFINITY, f64::min);
                let cutoff = floor + self.cfg.dominance_margin as f64;

                let mut created: SmallVec<[usize; 4]> = SmallVec::new();
                for (class, candidate) in best.iter().enumerate() {
                    let Some(candidate) = candidate else { continue };
                    if candidate.total_demerits > cutoff {
                        continue;
                    }
                    let line = arena[candidate.previous].line + 1;
                    arena.push(Breakpoint {
                        position: b_index as isize,
                        line,
                        fitness_class: class as u8,
                        ratio: candidate.ratio,
                        total_demerits: candidate.total_demerits,
                        total_width: after.width,
                        total_stretch: after.stretch,
                        total_shrink: after.shrink,
                        previous: Some(candidate.previous),
                    });
                    created.push(arena.len() - 1);
                }
                // New nodes go in right after the group that spawned them so
                // later breakpoints see them without rescanning them now.
                summary.nodes_created += created.len();
                for node in created {
                    active.insert(cursor, node);
                    cursor += 1;
                }
                summary.peak_active = summary.peak_active.max(active.len());
            }
        }
        Ok(())
    }

    /// Ratio of stretch (positive) or shrink (negative) a line from `a` to
    /// the breakpoint at `b_index` would consume. Degenerate lines with no
    /// flexibility in the needed direction report `+inf`.
    fn adjustment_ratio(
        &self,
        stream: &[Item],
        a: &Breakpoint,
        b_index: usize,
        sums: &RunningSums,
    ) -> f32 {
        let mut width = sums.width - a.total_width;
        if let Item::Penalty { width: penalty_width, .. } = &stream[b_index] {
            width += penalty_width;
        }
        let target = self.cfg.width;
        if width < target {
            let stretch = sums.stretch - a.total_stretch;
            if stretch > 0.0 {
                (target - width) / stretch
            } else {
                f32::INFINITY
            }
        } else if width > target {
            let shrink = sums.shrink - a.total_shrink;
            if shrink > 0.0 {
                (target - width) / shrink
            } else {
                f32::INFINITY
            }
        } else {
            0.0
        }
    }

    fn demerits(&self, stream: &[Item], a: &Breakpoint, b_index: usize, ratio: f32) -> f64 {
        let alpha = 1.0 + 100.0 * (ratio.abs() as f64).powi(3);
        let mut demerits = match &stream[b_index] {
            Item::Penalty { penalty, .. } if *penalty >= 0.0 => {
                (alpha + *penalty as f64).powi(2)
            }
            Item::Penalty { penalty, .. } if *penalty > f32::NEG_INFINITY => {
                alpha * alpha - (*penalty as f64) * (*penalty as f64)
            }
            _ => alpha * alpha,
        };
        if a.position >= 0
            && stream[a.position as usize].is_flagged_penalty()
            && stream[b_index].is_flagged_penalty()
        {
            demerits += self.cfg.flagged_penalty as f64;
        }
        let class = fitness_class(ratio);
        if (class as i32 - a.fitness_class as i32).abs() > 1 {
            demerits += self.cfg.fitness_penalty as f64;
        }
        demerits
    }
}

/// Fitness bucket for a line's adjustment ratio.
fn fitness_class(ratio: f32) -> u8 {
    if ratio < -0.5 {
        0
    } else if ratio < 0.5 {
        1
    } else if ratio < 1.0 {
        2
    } else {
        3
    }
}

/// Running sums a node created at `b_index` starts the next line with:
/// advanced past trailing glue and penalties to the next box, or to a forced
/// penalty beyond the break itself.
fn sums_after(stream: &[Item], b_index: usize, sums: &RunningSums) -> RunningSums {
    let mut after = *sums;
    for (offset, item) in stream[b_index..].iter().enumerate() {
        match item {
            Item::Glue {
                width,
                stretch,
                shrink,
            } => {
                after.width += width;
                after.stretch += stretch;
                after.shrink += shrink;
            }
            Item::Box { .. } => break,
            Item::Penalty { .. } => {
                if item.is_forced_break() && offset > 0 {
                    break;
                }
            }
        }
    }
    after
}
