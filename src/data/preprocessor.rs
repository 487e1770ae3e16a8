// ============================================================
// Layer 4 - Table Preprocessor
// ============================================================
// Turns a freshly loaded table into an all-numeric one.
//
// Steps (applied in order):
//   1. Remember the last column as the prediction target
//   2. Every text column with at most `max_categories` distinct
//      values is one-hot encoded: one `<column>_<value>` indicator
//      per value (sorted), then the original column is dropped
//   3. Every remaining text column is dropped
//   4. Missing feature cells are filled with the column mean
//   5. The target must still be present, with no missing cells
//
// Step 2 walks the columns as they were on load, so indicator
// columns appended along the way are never revisited.

use crate::domain::table::{Column, ColumnData, Table};
use crate::error::PipelineError;

/// Text columns with this many distinct values or fewer are encoded.
pub const MAX_ONE_HOT_CATEGORIES: usize = 4;

/// A numeric-only table plus the name of the column to predict.
#[derive(Debug, Clone)]
pub struct PreparedTable {
    pub table:  Table,
    pub target: String,
}

pub struct Preprocessor {
    max_categories: usize,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self { max_categories: MAX_ONE_HOT_CATEGORIES }
    }

    pub fn prepare(&self, mut table: Table) -> Result<PreparedTable, PipelineError> {
        let target = table
            .last_column_name()
            .map(str::to_string)
            .ok_or_else(|| PipelineError::EmptyDataset("table has no columns".into()))?;

        // ── Step 2: one-hot encode low-cardinality text ──────────────────────
        for name in table.column_names() {
            let encode = table
                .column(&name)
                .is_some_and(|c| c.is_textual() && c.distinct_count() <= self.max_categories);
            if !encode {
                continue;
            }
            if let Some(column) = table.remove_column(&name) {
                let indicators = one_hot(&column);
                tracing::info!(
                    "Dummies created for column '{}' ({} indicators)",
                    name,
                    indicators.len()
                );
                for mut indicator in indicators {
                    indicator.name = free_name(&table, indicator.name);
                    table.push_column(indicator);
                }
            }
        }

        // ── Step 3: drop everything still textual ────────────────────────────
        let leftover: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| c.is_textual())
            .map(|c| c.name.clone())
            .collect();
        for name in &leftover {
            tracing::warn!("Dropping non-numeric column '{}'", name);
            table.remove_column(name);
        }

        // ── Step 4: mean-impute missing features ─────────────────────────────
        for column in table.columns_mut().iter_mut().filter(|c| c.name != target) {
            impute_mean(column);
        }

        // ── Step 5: the target must survive, with no gaps ────────────────────
        let Some(target_column) = table.column(&target) else {
            return Err(PipelineError::TargetDropped(target));
        };
        let missing = target_column
            .to_numbers()
            .map(|v| v.iter().filter(|x| x.is_none()).count())
            .unwrap_or(0);
        if missing > 0 {
            return Err(PipelineError::MissingTarget { column: target, missing });
        }

        Ok(PreparedTable { table, target })
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// One indicator column per distinct value; missing cells are 0.
fn one_hot(column: &Column) -> Vec<Column> {
    let ColumnData::Text(values) = &column.data else {
        return Vec::new();
    };
    column
        .distinct_text()
        .into_iter()
        .map(|category| {
            let flags = values
                .iter()
                .map(|v| Some(v.as_deref() == Some(category.as_str())))
                .collect();
            Column::new(format!("{}_{}", column.name, category), ColumnData::Boolean(flags))
        })
        .collect()
}

/// `base`, or `base.1`, `base.2`, ... if the table already has it.
fn free_name(table: &Table, base: String) -> String {
    if !table.contains(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}.{n}");
        if !table.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn impute_mean(column: &mut Column) {
    let ColumnData::Numeric(values) = &mut column.data else {
        return;
    };
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.len() == values.len() {
        return;
    }
    let fill = if present.is_empty() {
        0.0
    } else {
        present.iter().sum::<f64>() / present.len() as f64
    };
    tracing::debug!(
        "Filling {} missing values in '{}' with {:.4}",
        values.len() - present.len(),
        column.name,
        fill
    );
    for v in values.iter_mut().filter(|v| v.is_none()) {
        *v = Some(fill);
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_delimited;

    fn prepare(csv: &str) -> Result<PreparedTable, PipelineError> {
        let table = parse_delimited(csv.as_bytes(), b',', "mem").unwrap();
        Preprocessor::new().prepare(table)
    }

    #[test]
    fn test_low_cardinality_text_is_one_hot_encoded() {
        let p = prepare("colour,y\nred,1\nblue,2\ngreen,3\nred,4\n").unwrap();
        assert!(!p.table.contains("colour"));
        assert!(p.table.contains("colour_blue"));
        assert!(p.table.contains("colour_green"));
        assert!(p.table.contains("colour_red"));
        assert_eq!(p.table.column_count(), 4);

        let red = p.table.column("colour_red").unwrap().to_numbers().unwrap();
        assert_eq!(red, vec![Some(1.0), Some(0.0), Some(0.0), Some(1.0)]);
    }

    #[test]
    fn test_high_cardinality_text_is_dropped() {
        let p = prepare("name,y\na,1\nb,2\nc,3\nd,4\ne,5\n").unwrap();
        assert!(!p.table.contains("name"));
        assert_eq!(p.table.column_names(), vec!["y"]);
    }

    #[test]
    fn test_every_remaining_column_is_numeric() {
        let p = prepare(
            "id,city,flag,size,y\n\
             a1,x,true,1,10\n\
             a2,y,false,,20\n\
             a3,x,true,3,30\n\
             a4,z,false,4,40\n\
             a5,y,true,5,50\n",
        ).unwrap();
        for column in p.table.columns() {
            let numbers = column.to_numbers().expect("numeric column");
            assert!(numbers.iter().all(|v| v.is_some_and(f64::is_finite)));
        }
        assert!(!p.table.contains("id"));
    }

    #[test]
    fn test_missing_numbers_take_column_mean() {
        let p = prepare("x,y\n1,0\n,1\n3,0\n").unwrap();
        let x = p.table.column("x").unwrap().to_numbers().unwrap();
        assert_eq!(x, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_nan_and_inf_cells_are_imputed() {
        let p = prepare("x,y\n1,0\nNaN,1\n3,0\ninf,2\n").unwrap();
        let x = p.table.column("x").unwrap().to_numbers().unwrap();
        assert_eq!(x, vec![Some(1.0), Some(2.0), Some(3.0), Some(2.0)]);
        assert!(x.iter().all(|v| v.is_some_and(f64::is_finite)));
    }

    #[test]
    fn test_na_markers_keep_numeric_column() {
        let p = prepare("x,age,y\n1,31,0\n2,NA,1\n3,40,0\n4,22,1\n5,50,0\n6,61,1\n").unwrap();
        assert_eq!(p.table.column_names(), vec!["x", "age", "y"]);
        let age = p.table.column("age").unwrap().to_numbers().unwrap();
        assert_eq!(age[1], Some(40.8));
    }

    #[test]
    fn test_missing_target_is_rejected() {
        let err = prepare("x,y\n1,0\n2,\n3,NA\n4,1\n").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingTarget { ref column, missing: 2 } if column == "y"
        ));
    }

    #[test]
    fn test_indicator_clash_gets_suffix() {
        let p = prepare("a_x,a,y\n1,x,5\n2,x,6\n").unwrap();
        assert_eq!(p.table.column_names(), vec!["a_x", "y", "a_x.1"]);
        let original = p.table.column("a_x").unwrap().to_numbers().unwrap();
        assert_eq!(original, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_target_is_last_column() {
        let p = prepare("a,b,target\n1,2,3\n4,5,6\n").unwrap();
        assert_eq!(p.target, "target");
    }

    #[test]
    fn test_high_cardinality_text_target_is_rejected() {
        let err = prepare("x,label\n1,a\n2,b\n3,c\n4,d\n5,e\n").unwrap_err();
        assert!(matches!(err, PipelineError::TargetDropped(t) if t == "label"));
    }

    #[test]
    fn test_encoded_text_target_is_rejected() {
        let err = prepare("x,label\n1,a\n2,b\n3,a\n").unwrap_err();
        assert!(matches!(err, PipelineError::TargetDropped(_)));
    }
}
