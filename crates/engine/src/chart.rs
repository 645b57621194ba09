use crate::cell::{Cell, Token, TokenId};
use crate::cell_id::CellRef;
use crate::events::{ChartEvent, EventCallback, LabelTarget, Listeners, SubscriptionId};
use crate::flight::FlightPresenter;
use crate::history::{HistoryEntry, StarHistory};
use crate::palette::ColorSelector;

/// Longest label or title kept, in characters.
pub const MAX_LABEL_CHARS: usize = 50;

/// Stored when a row or column is renamed to nothing.
pub const UNNAMED_LABEL: &str = "(Unnamed)";

/// Stored when the chart title is set to nothing.
pub const UNTITLED_CHART: &str = "(Untitled chart)";

/// Trim and cap a label. None when nothing is left.
pub fn clean_label(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_LABEL_CHARS).collect())
}

/// Result of `Chart::undo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    NothingToUndo,
    Undone { token: TokenId, cell: CellRef },
}

impl UndoOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, UndoOutcome::NothingToUndo)
    }
}

/// An assignment or behavior column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    label: String,
}

impl Column {
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A student row: label, one cell per column, and the row's star total.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    label: String,
    cells: Vec<Cell>,
    star_count: usize,
}

impl Row {
    fn new(label: String, columns: usize) -> Self {
        Self {
            label,
            cells: vec![Cell::new(); columns],
            star_count: 0,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn star_count(&self) -> usize {
        self.star_count
    }

    fn recount(&mut self) {
        self.star_count = self.cells.iter().map(Cell::len).sum();
    }
}

/// The reward chart: title, columns, rows of cells, and undo history.
///
/// All mutation goes through `&mut self`, so two mutations can never
/// interleave. Observers learn about changes through `subscribe`.
#[derive(Debug)]
pub struct Chart {
    title: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    history: StarHistory,
    selector: ColorSelector,
    show_mode: bool,
    dirty: bool,
    /// Next id to hand out. Monotonically increasing, never reused.
    next_token_id: u64,
    listeners: Listeners,
}

impl Default for Chart {
    fn default() -> Self {
        Self::new()
    }
}

impl Chart {
    /// Empty chart with the default title.
    pub fn new() -> Self {
        Self::with_selector(ColorSelector::new())
    }

    /// Empty chart drawing colors from `selector`.
    pub fn with_selector(selector: ColorSelector) -> Self {
        Self {
            title: UNTITLED_CHART.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            history: StarHistory::new(),
            selector,
            show_mode: false,
            dirty: false,
            next_token_id: 1,
            listeners: Listeners::new(),
        }
    }

    fn generate_token_id(&mut self) -> TokenId {
        let id = TokenId(self.next_token_id);
        self.next_token_id += 1;
        id
    }

    fn emit(&mut self, event: ChartEvent) {
        self.listeners.emit(&event);
    }

    fn emit_history(&mut self) {
        let pending = self.history.len();
        self.emit(ChartEvent::HistoryChanged { pending });
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn subscribe(&mut self, callback: EventCallback) -> SubscriptionId {
        self.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    pub fn star_count(&self, row: usize) -> Option<usize> {
        self.rows.get(row).map(Row::star_count)
    }

    pub fn total_stars(&self) -> usize {
        self.rows.iter().map(Row::star_count).sum()
    }

    /// Index of the first row labelled `label`.
    pub fn find_row(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.label == label)
    }

    /// Index of the first column labelled `label`.
    pub fn find_column(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == label)
    }

    pub fn history(&self) -> &StarHistory {
        &self.history
    }

    /// True when there is a placement to undo.
    pub fn has_pending(&self) -> bool {
        self.history.has_pending()
    }

    pub fn selector(&self) -> &ColorSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut ColorSelector {
        &mut self.selector
    }

    // =========================================================================
    // Show mode and dirty tracking
    // =========================================================================

    pub fn is_show_mode(&self) -> bool {
        self.show_mode
    }

    pub fn set_show_mode(&mut self, on: bool) {
        self.show_mode = on;
    }

    /// Flip show mode, returning the new state.
    pub fn toggle_show_mode(&mut self) -> bool {
        self.show_mode = !self.show_mode;
        self.show_mode
    }

    /// True if the chart changed since it was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    // =========================================================================
    // Structure and labels
    // =========================================================================

    pub fn set_title(&mut self, text: &str) {
        self.title = clean_label(text).unwrap_or_else(|| UNTITLED_CHART.to_string());
        self.dirty = true;
        self.emit(ChartEvent::LabelChanged { target: LabelTarget::Title });
    }

    /// Append a column. Blank labels are ignored.
    pub fn add_column(&mut self, label: &str) -> bool {
        let Some(label) = clean_label(label) else {
            return false;
        };
        self.columns.push(Column { label });
        for row in self.rows.iter_mut() {
            row.cells.push(Cell::new());
        }
        self.dirty = true;
        self.emit(ChartEvent::ColumnAdded { index: self.columns.len() - 1 });
        true
    }

    /// Append a row with one empty cell per column. Blank labels are ignored.
    pub fn add_row(&mut self, label: &str) -> bool {
        let Some(label) = clean_label(label) else {
            return false;
        };
        self.rows.push(Row::new(label, self.columns.len()));
        self.dirty = true;
        self.emit(ChartEvent::RowAdded { index: self.rows.len() - 1 });
        true
    }

    pub fn rename_column(&mut self, index: usize, text: &str) -> bool {
        match self.columns.get_mut(index) {
            Some(column) => {
                column.label = clean_label(text).unwrap_or_else(|| UNNAMED_LABEL.to_string());
                self.dirty = true;
                self.emit(ChartEvent::LabelChanged { target: LabelTarget::Column(index) });
                true
            }
            None => false,
        }
    }

    pub fn rename_row(&mut self, index: usize, text: &str) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.label = clean_label(text).unwrap_or_else(|| UNNAMED_LABEL.to_string());
                self.dirty = true;
                self.emit(ChartEvent::LabelChanged { target: LabelTarget::Row(index) });
                true
            }
            None => false,
        }
    }

    /// Remove a row and every token in it, purging their history entries.
    pub fn remove_row(&mut self, index: usize) -> bool {
        if index >= self.rows.len() {
            return false;
        }
        let purged = self.history.purge(|e| e.cell.row == index);
        self.history.shift_rows_after(index);
        let removed = self.rows.remove(index);
        self.dirty = true;
        log::debug!(
            "removed row {} ({:?}): {} stars, {} history entries",
            index,
            removed.label,
            removed.star_count,
            purged
        );
        self.emit(ChartEvent::StructureRemoved { purged });
        self.emit_history();
        true
    }

    /// Remove a column and its cell from every row, purging history entries.
    pub fn remove_column(&mut self, index: usize) -> bool {
        if index >= self.columns.len() {
            return false;
        }
        let purged = self.history.purge(|e| e.cell.col == index);
        self.history.shift_cols_after(index);
        self.columns.remove(index);
        for row in self.rows.iter_mut() {
            row.cells.remove(index);
            row.recount();
        }
        self.dirty = true;
        log::debug!("removed column {}: {} history entries", index, purged);
        self.emit(ChartEvent::StructureRemoved { purged });
        self.emit_history();
        true
    }

    /// Drop every row and column. The title is left alone.
    pub fn clear_chart(&mut self) {
        self.columns.clear();
        self.rows.clear();
        self.history.clear();
        self.dirty = true;
        self.emit(ChartEvent::Reset);
        self.emit_history();
    }

    /// Remove every token but keep rows, columns and labels.
    pub fn clear_stars(&mut self) {
        for row in self.rows.iter_mut() {
            for cell in row.cells.iter_mut() {
                cell.clear();
            }
            row.recount();
        }
        self.history.clear();
        self.dirty = true;
        self.emit(ChartEvent::StarsCleared);
        self.emit_history();
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Place a token and attach it immediately.
    ///
    /// Does nothing (returns None) outside show mode or for a bad coordinate.
    /// Without a `color` (or with a blank one), the selector picks one.
    pub fn place_token(&mut self, row: usize, col: usize, color: Option<&str>) -> Option<TokenId> {
        let id = self.begin_placement(row, col, color)?;
        self.settle_token(id);
        Some(id)
    }

    /// First phase of a placement: create the token and its history entry now,
    /// park the token in the target cell until `settle_token`.
    pub fn begin_placement(&mut self, row: usize, col: usize, color: Option<&str>) -> Option<TokenId> {
        if !self.show_mode {
            log::debug!("placement at ({}, {}) ignored outside show mode", row, col);
            return None;
        }
        if row >= self.rows.len() || col >= self.columns.len() {
            return None;
        }

        let color = match color.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) => c.to_string(),
            None => self.selector.next().to_string(),
        };
        let id = self.generate_token_id();
        let cell = CellRef::new(row, col);
        log::debug!("token {} ({}) requested for {}", id, color, cell);

        self.rows[row].cells[col].park(Token::new(id, color));
        self.history.push(id, cell);
        self.dirty = true;
        self.emit(ChartEvent::TokenPlaced { token: id, cell });
        self.emit_history();
        Some(id)
    }

    /// Second phase: attach a landing token to its cell.
    ///
    /// False when the token is no longer landing (undone, cleared, its row or
    /// column removed, or already settled).
    pub fn settle_token(&mut self, id: TokenId) -> bool {
        let Some(cell) = self.landing_cell(id) else {
            return false;
        };
        let row = &mut self.rows[cell.row];
        if !row.cells[cell.col].settle(id) {
            return false;
        }
        row.recount();
        self.emit(ChartEvent::TokenSettled { token: id, cell });
        true
    }

    /// Begin a placement and hand the token to a presenter to animate.
    pub fn launch_token<P: FlightPresenter>(
        &mut self,
        row: usize,
        col: usize,
        presenter: &mut P,
    ) -> Option<TokenId> {
        let id = self.begin_placement(row, col, None)?;
        let color = self.rows[row].cells[col]
            .landing()
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.color.clone())
            .unwrap_or_default();
        let handle = presenter.render_token(&color);
        presenter.animate_to_cell(handle, id, CellRef::new(row, col));
        Some(id)
    }

    fn landing_cell(&self, id: TokenId) -> Option<CellRef> {
        // Every landing token has a history entry: entries only disappear
        // together with their token.
        let entry = self.history.entries().iter().find(|e| e.token == id)?;
        let cell = self.cell(entry.cell.row, entry.cell.col)?;
        cell.landing().iter().any(|t| t.id == id).then_some(entry.cell)
    }

    /// Attach a token without recording history. Used when rebuilding a chart
    /// from a saved document; works regardless of show mode.
    pub fn attach_loaded_token(&mut self, row: usize, col: usize, color: &str) -> Option<TokenId> {
        if row >= self.rows.len() || col >= self.columns.len() {
            return None;
        }
        let id = self.generate_token_id();
        let target = &mut self.rows[row];
        target.cells[col].attach(Token::new(id, color));
        target.recount();
        Some(id)
    }

    // =========================================================================
    // Undo
    // =========================================================================

    /// Undo the most recent placement still in history.
    pub fn undo(&mut self) -> UndoOutcome {
        let Some(HistoryEntry { token, cell }) = self.history.pop() else {
            self.emit_history();
            return UndoOutcome::NothingToUndo;
        };

        if let Some(row) = self.rows.get_mut(cell.row) {
            if let Some(target) = row.cells.get_mut(cell.col) {
                if target.remove(token).is_none() {
                    log::warn!("undo: token {} not found in {}", token, cell);
                }
            }
            row.recount();
        }
        self.dirty = true;
        log::debug!("undid token {} at {}", token, cell);
        self.emit(ChartEvent::TokenUndone { token, cell });
        self.emit_history();
        UndoOutcome::Undone { token, cell }
    }

    // =========================================================================
    // Load support
    // =========================================================================

    /// Replace this chart's contents with `loaded`.
    ///
    /// Listeners, the color selector and show mode stay with `self`. History
    /// is empty afterwards and the chart is clean.
    pub fn replace_with(&mut self, loaded: Chart) {
        self.title = loaded.title;
        self.columns = loaded.columns;
        self.rows = loaded.rows;
        self.next_token_id = self.next_token_id.max(loaded.next_token_id);
        self.history.clear();
        self.dirty = false;
        self.emit(ChartEvent::Reset);
        self.emit_history();
    }

    /// Check the structural invariants. Returns a description of the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        let cols = self.columns.len();
        let mut seen = std::collections::HashSet::new();
        for (r, row) in self.rows.iter().enumerate() {
            if row.cells.len() != cols {
                return Err(format!("row {} has {} cells, expected {}", r, row.cells.len(), cols));
            }
            let counted: usize = row.cells.iter().map(Cell::len).sum();
            if row.star_count != counted {
                return Err(format!("row {} star_count {} != {}", r, row.star_count, counted));
            }
            for cell in &row.cells {
                for token in cell.tokens().iter().chain(cell.landing()) {
                    if !seen.insert(token.id) {
                        return Err(format!("token {} appears twice", token.id));
                    }
                }
            }
        }
        let mut in_history = std::collections::HashSet::new();
        for entry in self.history.entries() {
            if !in_history.insert(entry.token) {
                return Err(format!("token {} recorded twice in history", entry.token));
            }
            let owned = self
                .cell(entry.cell.row, entry.cell.col)
                .map(|c| c.contains(entry.token))
                .unwrap_or(false);
            if !owned {
                return Err(format!("history entry {} points at {} which lacks it", entry.token, entry.cell));
            }
        }
        for row in &self.rows {
            for cell in &row.cells {
                if let Some(t) = cell.landing().iter().find(|t| !in_history.contains(&t.id)) {
                    return Err(format!("landing token {} has no history entry", t.id));
                }
            }
        }
        Ok(())
    }
}
