/// Stable identity of a placed token. Monotonically increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u64);

impl TokenId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A colored reward marker ("star") placed in a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: TokenId,
    /// CSS color string, either from the palette or carried over from an imported file.
    pub color: String,
}

impl Token {
    pub fn new(id: TokenId, color: impl Into<String>) -> Self {
        Self { id, color: color.into() }
    }
}

/// One grid cell: the tokens that have landed here, plus tokens still in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// Attached tokens in visual order (left to right).
    tokens: Vec<Token>,
    /// Requested for this cell but not settled yet. Not counted, not saved.
    landing: Vec<Token>,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn landing(&self) -> &[Token] {
        &self.landing
    }

    /// Number of attached tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn colors(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.color.as_str())
    }

    pub(crate) fn attach(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub(crate) fn park(&mut self, token: Token) {
        self.landing.push(token);
    }

    /// Move a landing token into the attached list. False if it is not landing here.
    pub(crate) fn settle(&mut self, id: TokenId) -> bool {
        match self.landing.iter().position(|t| t.id == id) {
            Some(pos) => {
                let token = self.landing.remove(pos);
                self.tokens.push(token);
                true
            }
            None => false,
        }
    }

    /// Remove a token by id from either list.
    pub(crate) fn remove(&mut self, id: TokenId) -> Option<Token> {
        if let Some(pos) = self.tokens.iter().position(|t| t.id == id) {
            return Some(self.tokens.remove(pos));
        }
        self.landing
            .iter()
            .position(|t| t.id == id)
            .map(|pos| self.landing.remove(pos))
    }

    pub(crate) fn contains(&self, id: TokenId) -> bool {
        self.tokens.iter().chain(self.landing.iter()).any(|t| t.id == id)
    }

    pub(crate) fn clear(&mut self) {
        self.tokens.clear();
        self.landing.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_moves_landing_token() {
        let mut cell = Cell::new();
        cell.park(Token::new(TokenId(1), "#FFD400"));
        assert_eq!(cell.len(), 0);
        assert_eq!(cell.landing().len(), 1);

        assert!(cell.settle(TokenId(1)));
        assert_eq!(cell.len(), 1);
        assert!(cell.landing().is_empty());

        // Second settle is a no-op
        assert!(!cell.settle(TokenId(1)));
    }

    #[test]
    fn test_remove_finds_either_list() {
        let mut cell = Cell::new();
        cell.attach(Token::new(TokenId(1), "#FF6B00"));
        cell.park(Token::new(TokenId(2), "#FF3B3B"));

        assert_eq!(cell.remove(TokenId(2)).map(|t| t.color), Some("#FF3B3B".to_string()));
        assert_eq!(cell.remove(TokenId(1)).map(|t| t.id), Some(TokenId(1)));
        assert!(cell.remove(TokenId(1)).is_none());
    }

    #[test]
    fn test_remove_keeps_order_of_others() {
        let mut cell = Cell::new();
        for (i, color) in ["a", "b", "c"].iter().enumerate() {
            cell.attach(Token::new(TokenId(i as u64), *color));
        }
        cell.remove(TokenId(1));
        assert_eq!(cell.colors().collect::<Vec<_>>(), vec!["a", "c"]);
    }
}
