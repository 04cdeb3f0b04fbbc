use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::io::{self, BufRead, Write};

/// One NDJSON line of the evaluation corpus
#[derive(Deserialize)]
pub struct PositionRecord {
    pub fen: String,
    #[serde(default)]
    pub evals: Vec<EvalEntry>,
}

#[derive(Deserialize)]
pub struct EvalEntry {
    pub knodes: Option<u64>,
    pub depth: Option<u32>,
    #[serde(default)]
    pub pvs: Vec<PvEntry>,
}

#[derive(Deserialize)]
pub struct PvEntry {
    pub cp: Option<i64>,
    pub mate: Option<i32>,
    pub line: Option<String>,
}

/// One flattened (position, evaluation, principal variation) record
#[derive(Debug, Clone, PartialEq)]
pub struct EvalRow {
    pub fen: String,
    pub knodes: Option<u64>,
    pub depth: Option<u32>,
    pub cp: Option<i64>,
    pub mate: Option<i32>,
    pub line: Option<String>,

    pub best_move: Option<String>,
    pub popular_move: Option<String>,
}

/// Flattens up to `max_rows` NDJSON lines into one record per principal
/// variation. Positions without evals, or evals without pvs, contribute
/// nothing. A line that fails to parse aborts the whole extraction.
pub fn extract<R: BufRead>(
    read: R,
    max_rows: usize,
    mut on_line: impl FnMut(),
) -> Result<Vec<EvalRow>, Box<dyn Error>> {
    let mut rows = Vec::new();

    for (index, line) in read.lines().enumerate() {
        if index >= max_rows {
            break;
        }

        let line = line?;
        let record: PositionRecord = serde_json::from_str(&line)?;

        for eval in &record.evals {
            for pv in &eval.pvs {
                rows.push(EvalRow {
                    fen: record.fen.clone(),
                    knodes: eval.knodes,
                    depth: eval.depth,
                    cp: pv.cp,
                    mate: pv.mate,
                    line: pv.line.clone(),
                    best_move: None,
                    popular_move: None,
                });
            }
        }

        on_line();
    }

    Ok(rows)
}

/// The first whitespace-delimited token of the engine line is the label.
pub fn extract_best_move(rows: &mut [EvalRow]) {
    for row in rows.iter_mut() {
        row.best_move = row
            .line
            .as_ref()
            .and_then(|line| line.split_whitespace().next())
            .map(str::to_string);
    }
}

/// Attaches the most frequent primary label of each position as a
/// diagnostic column. Count ties keep the move that was seen first.
pub fn attach_popular_move(rows: &mut [EvalRow]) {
    let mut counts: HashMap<String, Vec<(String, usize)>> = HashMap::new();

    for row in rows.iter() {
        if let Some(m) = &row.best_move {
            let moves = counts.entry(row.fen.clone()).or_default();
            match moves.iter_mut().find(|(text, _)| text == m) {
                Some((_, n)) => *n += 1,
                None => moves.push((m.clone(), 1)),
            }
        }
    }

    let popular: HashMap<String, String> = counts
        .into_iter()
        .map(|(fen, moves)| {
            let mut best = &moves[0];
            for candidate in &moves[1..] {
                if candidate.1 > best.1 {
                    best = candidate;
                }
            }
            (fen, best.0.clone())
        })
        .collect();

    for row in rows.iter_mut() {
        row.popular_move = popular.get(&row.fen).cloned();
    }
}

/// Keeps one row per position: only rows at the maximum search depth are
/// considered; among them the literal smallest mate count wins if any
/// mate is present, otherwise the largest centipawn score. Groups are
/// processed in sorted FEN order and ties keep the first occurrence, so
/// the selection is deterministic.
pub fn select_best_rows(rows: Vec<EvalRow>) -> Result<Vec<EvalRow>, Box<dyn Error>> {
    let mut groups: BTreeMap<String, Vec<EvalRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.fen.clone()).or_default().push(row);
    }

    let mut selected = Vec::with_capacity(groups.len());

    for (fen, group) in groups {
        let max_depth = group
            .iter()
            .filter_map(|row| row.depth)
            .max()
            .ok_or_else(|| format!("no search depth recorded for position {}", fen))?;

        let mut best_mate: Option<(i32, &EvalRow)> = None;
        let mut best_cp: Option<(i64, &EvalRow)> = None;

        for row in group.iter().filter(|row| row.depth == Some(max_depth)) {
            if let Some(mate) = row.mate {
                if best_mate.map_or(true, |(m, _)| mate < m) {
                    best_mate = Some((mate, row));
                }
            }
            if let Some(cp) = row.cp {
                if best_cp.map_or(true, |(c, _)| cp > c) {
                    best_cp = Some((cp, row));
                }
            }
        }

        let best = match (best_mate, best_cp) {
            (Some((_, row)), _) => row,
            (None, Some((_, row))) => row,
            (None, None) => {
                return Err(format!(
                    "no centipawn or mate score at depth {} for position {}",
                    max_depth, fen
                )
                .into())
            }
        };

        selected.push(best.clone());
    }

    Ok(selected)
}

/// Writes the curated schema: row index, position, best-move label, and
/// optionally the popularity diagnostic. Missing labels stay empty.
pub fn write_csv(write: &mut dyn Write, rows: &[EvalRow], keep_popular: bool) -> io::Result<()> {
    if keep_popular {
        writeln!(write, ",fen,best_move,popular_move")?;
    } else {
        writeln!(write, ",fen,best_move")?;
    }

    for (index, row) in rows.iter().enumerate() {
        let best = row.best_move.as_deref().unwrap_or("");
        if keep_popular {
            writeln!(
                write,
                "{},{},{},{}",
                index,
                row.fen,
                best,
                row.popular_move.as_deref().unwrap_or("")
            )?;
        } else {
            writeln!(write, "{},{},{}", index, row.fen, best)?;
        }
    }

    Ok(())
}

/// One row of the curated CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuratedRow {
    pub fen: String,
    pub best_move: String,
}

/// Parses a CSV written by `write_csv`. FEN text never contains commas,
/// so plain field splitting is enough. Labels may be empty.
pub fn read_csv<R: BufRead>(read: R) -> Result<Vec<CuratedRow>, Box<dyn Error>> {
    let mut rows = Vec::new();

    for (index, line) in read.lines().enumerate() {
        let line = line?;
        if index == 0 {
            continue; // header
        }

        let mut fields = line.splitn(4, ',');
        let _row_index = fields.next();
        let fen = fields
            .next()
            .ok_or_else(|| format!("malformed csv line {}", index + 1))?;
        let best_move = fields
            .next()
            .ok_or_else(|| format!("malformed csv line {}", index + 1))?;

        rows.push(CuratedRow {
            fen: fen.to_string(),
            best_move: best_move.to_string(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curate(input: &str) -> Result<Vec<EvalRow>, Box<dyn Error>> {
        let mut rows = extract(input.as_bytes(), usize::MAX, || {})?;
        extract_best_move(&mut rows);
        attach_popular_move(&mut rows);
        select_best_rows(rows)
    }

    #[test]
    fn extract_flattens_every_pv() {
        let input = concat!(
            r#"{"fen":"F1","evals":[{"knodes":10,"depth":20,"pvs":[{"cp":30,"line":"e2e4 e7e5"},{"cp":10,"line":"d2d4"}]}]}"#,
            "\n",
            r#"{"fen":"F2","evals":[]}"#,
        );

        let rows = extract(input.as_bytes(), usize::MAX, || {}).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fen, "F1");
        assert_eq!(rows[0].cp, Some(30));
        assert_eq!(rows[1].line.as_deref(), Some("d2d4"));
    }

    #[test]
    fn extract_respects_the_row_cap() {
        let input = concat!(
            r#"{"fen":"F1","evals":[{"depth":10,"knodes":1,"pvs":[{"cp":1,"line":"a2a3"}]}]}"#,
            "\n",
            r#"{"fen":"F2","evals":[{"depth":10,"knodes":1,"pvs":[{"cp":1,"line":"a2a4"}]}]}"#,
        );

        let rows = extract(input.as_bytes(), 1, || {}).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fen, "F1");
    }

    #[test]
    fn extract_aborts_on_a_malformed_line() {
        let input = concat!(
            r#"{"fen":"F1","evals":[]}"#,
            "\n",
            "{not json}",
            "\n",
            r#"{"fen":"F2","evals":[]}"#,
        );

        assert!(extract(input.as_bytes(), usize::MAX, || {}).is_err());
    }

    #[test]
    fn best_move_is_the_first_token() {
        let mut rows = vec![
            EvalRow {
                fen: "F1".into(),
                knodes: None,
                depth: Some(1),
                cp: Some(0),
                mate: None,
                line: Some("e2e4 e7e5 g1f3".into()),
                best_move: None,
                popular_move: None,
            },
            EvalRow {
                fen: "F1".into(),
                knodes: None,
                depth: Some(1),
                cp: Some(0),
                mate: None,
                line: None,
                best_move: None,
                popular_move: None,
            },
        ];

        extract_best_move(&mut rows);
        assert_eq!(rows[0].best_move.as_deref(), Some("e2e4"));
        assert_eq!(rows[1].best_move, None);
    }

    #[test]
    fn deeper_evaluation_always_wins() {
        let input = concat!(
            r#"{"fen":"F1","evals":[{"knodes":1,"depth":10,"pvs":[{"cp":500,"line":"e2e4"}]},{"knodes":2,"depth":12,"pvs":[{"cp":-50,"line":"d2d4"}]}]}"#,
        );

        let rows = curate(input).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].best_move.as_deref(), Some("d2d4"));
        assert_eq!(rows[0].depth, Some(12));
    }

    #[test]
    fn mate_beats_any_centipawn_score() {
        let input = concat!(
            r#"{"fen":"F1","evals":[{"knodes":1,"depth":12,"pvs":[{"cp":500,"line":"e2e4"},{"mate":3,"line":"d2d4"}]}]}"#,
        );

        let rows = curate(input).unwrap();
        assert_eq!(rows[0].best_move.as_deref(), Some("d2d4"));
    }

    #[test]
    fn mate_counts_compare_literally() {
        // the smaller mate value wins even when it is the side being mated
        let input = concat!(
            r#"{"fen":"F1","evals":[{"knodes":1,"depth":12,"pvs":[{"mate":3,"line":"e2e4"},{"mate":-2,"line":"d2d4"}]}]}"#,
        );

        let rows = curate(input).unwrap();
        assert_eq!(rows[0].best_move.as_deref(), Some("d2d4"));
    }

    #[test]
    fn missing_scores_everywhere_is_an_error() {
        let input = concat!(
            r#"{"fen":"F1","evals":[{"knodes":1,"depth":12,"pvs":[{"line":"e2e4"}]}]}"#,
        );

        assert!(curate(input).is_err());
    }

    #[test]
    fn popular_move_counts_across_evaluations() {
        let input = concat!(
            r#"{"fen":"F1","evals":[{"knodes":1,"depth":10,"pvs":[{"cp":1,"line":"e2e4"},{"cp":2,"line":"d2d4"}]},{"knodes":1,"depth":12,"pvs":[{"cp":3,"line":"e2e4"}]}]}"#,
        );

        let rows = curate(input).unwrap();
        assert_eq!(rows[0].popular_move.as_deref(), Some("e2e4"));
    }

    #[test]
    fn popular_move_ties_keep_the_first_seen() {
        let input = concat!(
            r#"{"fen":"F1","evals":[{"knodes":1,"depth":10,"pvs":[{"cp":1,"line":"g1f3"},{"cp":2,"line":"d2d4"}]}]}"#,
        );

        let rows = curate(input).unwrap();
        assert_eq!(rows[0].popular_move.as_deref(), Some("g1f3"));
    }

    #[test]
    fn groups_come_out_in_sorted_fen_order() {
        let input = concat!(
            r#"{"fen":"Z9","evals":[{"knodes":1,"depth":10,"pvs":[{"cp":1,"line":"a2a3"}]}]}"#,
            "\n",
            r#"{"fen":"A1","evals":[{"knodes":1,"depth":10,"pvs":[{"cp":1,"line":"a2a4"}]}]}"#,
        );

        let rows = curate(input).unwrap();
        assert_eq!(rows[0].fen, "A1");
        assert_eq!(rows[1].fen, "Z9");
    }

    #[test]
    fn curation_is_idempotent() {
        let input = concat!(
            r#"{"fen":"F1","evals":[{"knodes":1,"depth":10,"pvs":[{"cp":100,"line":"e2e4 e7e5"},{"cp":100,"line":"d2d4"}]},{"knodes":2,"depth":12,"pvs":[{"mate":5,"line":"g1f3"}]}]}"#,
            "\n",
            r#"{"fen":"F2","evals":[{"knodes":1,"depth":8,"pvs":[{"cp":-20,"line":"c2c4"}]}]}"#,
        );

        assert_eq!(curate(input).unwrap(), curate(input).unwrap());
    }

    #[test]
    fn csv_round_trip() {
        let input = concat!(
            r#"{"fen":"8/8/8/8/8/8/8/K6k w - - 0 1","evals":[{"knodes":1,"depth":10,"pvs":[{"cp":0,"line":"a1a2 h1h2"}]}]}"#,
        );

        let rows = curate(input).unwrap();
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &rows, false).unwrap();

        let parsed = read_csv(buffer.as_slice()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].fen, "8/8/8/8/8/8/8/K6k w - - 0 1");
        assert_eq!(parsed[0].best_move, "a1a2");
    }

    #[test]
    fn csv_keeps_the_popularity_column_on_request() {
        let input = concat!(
            r#"{"fen":"F1","evals":[{"knodes":1,"depth":10,"pvs":[{"cp":1,"line":"e2e4"}]}]}"#,
        );

        let rows = curate(input).unwrap();
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &rows, true).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, ",fen,best_move,popular_move\n0,F1,e2e4,e2e4\n");
    }
}
