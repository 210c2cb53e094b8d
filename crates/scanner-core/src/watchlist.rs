//! Built-in watchlist and its ISIN/WKN reference table.

use crate::{SecurityIds, Symbol, ValidationError, WatchlistEntry};

/// Symbol, ISIN, WKN in watchlist order.
static BUILTIN: [(&str, &str, &str); 63] = [
    // S&P 100 core
    ("AAPL", "US0378331005", "865985"),
    ("MSFT", "US5949181045", "870747"),
    ("NVDA", "US67066G1040", "918422"),
    ("GOOGL", "US02079K3059", "A14Y6F"),
    ("AMZN", "US0231351067", "906866"),
    ("META", "US30303M1027", "A1JWVX"),
    ("TSLA", "US88160R1014", "A1CX3T"),
    ("BRK.B", "US0846701086", "900944"),
    ("JPM", "US46625H1005", "850628"),
    ("V", "US92826C8394", "A0NC7B"),
    ("UNH", "US91324P1021", "869561"),
    ("XOM", "US30231G1022", "852549"),
    ("LLY", "US5324571083", "858560"),
    ("JNJ", "US4781601046", "853260"),
    ("WMT", "US9311421039", "860853"),
    ("MA", "US57636Q1040", "A0F602"),
    ("PG", "US7427181091", "852062"),
    ("HD", "US4370761029", "866953"),
    ("ORCL", "US68389X1054", "871460"),
    ("COST", "US22160K1051", "888351"),
    ("MRK", "US58933Y1055", "A0YD8Q"),
    ("ABBV", "US00287Y1091", "A1J84E"),
    ("CVX", "US1667641005", "852552"),
    ("BAC", "US0605051046", "858388"),
    ("KO", "US1912161007", "850663"),
    ("PEP", "US7134481081", "851995"),
    ("CSCO", "US17275R1023", "878841"),
    ("TMO", "US8835561023", "A14Y74"),
    ("ACN", "IE00B7BKVD75", "A0YZ78"),
    ("MCD", "US5801351017", "856958"),
    ("ABT", "US0028241000", "850103"),
    ("NKE", "US6541061031", "866993"),
    ("DHR", "US2358511028", "866197"),
    ("TXN", "US8825081040", "852654"),
    ("NEE", "US65339F1012", "A0NHL8"),
    ("PM", "US7181721090", "A0NDBJ"),
    ("AMGN", "US0311621009", "867900"),
    ("LIN", "IE00BZ12WP82", "A2DKLU"),
    ("RTX", "US75513E1010", "A2PGM6"),
    ("QCOM", "US7475251036", "883121"),
    ("HON", "US4385161066", "870888"),
    ("IBM", "US4592001014", "851399"),
    ("GE", "US36266G1013", "A3DLAP"),
    ("CAT", "US1491231015", "858437"),
    ("SBUX", "US8552441094", "884437"),
    ("BA", "US0970231058", "850471"),
    ("GS", "US38141G1040", "920332"),
    ("MS", "US6174464486", "885836"),
    ("NFLX", "US64110L1061", "552484"),
    ("AMD", "US0079031078", "863186"),
    // Semiconductors and hardware
    ("AMAT", "US0382221051", "865177"),
    ("MRVL", "US57344Q1058", "A2QM30"),
    ("ARM", "GB00BN090394", "A3EX3R"),
    // International listings and ADRs
    ("ASML", "NL0010273215", "A1J4U4"),
    ("TSM", "US8740391003", "909800"),
    ("NVO", "DK0062498333", "A3EU6F"),
    ("SAP", "DE0007164600", "716460"),
    // Pharma and biotech
    ("REGN", "US75886F1075", "881535"),
    ("ISRG", "US46120E6023", "203810"),
    ("VRTX", "US92532F1003", "882807"),
    // Financials and data
    ("BLK", "US09247X1019", "928193"),
    ("SPGI", "US78409V1044", "880585"),
    ("MCO", "US6153031088", "915246"),
];

/// Static ISIN/WKN pair for `symbol`, or the placeholder pair when the symbol
/// is not in the reference table.
pub fn lookup_ids(symbol: &str) -> SecurityIds {
    BUILTIN
        .iter()
        .find(|(candidate, _, _)| *candidate == symbol)
        .map(|&(_, isin, wkn)| SecurityIds::new(isin, wkn))
        .unwrap_or(SecurityIds::PLACEHOLDER)
}

/// Immutable, ordered set of symbols scanned by the watchlist reports.
///
/// Built once at startup and shared with every report builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    entries: Vec<WatchlistEntry>,
}

impl Watchlist {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .filter_map(|&(raw, isin, wkn)| {
                    Symbol::parse(raw).ok().map(|symbol| WatchlistEntry {
                        symbol,
                        ids: SecurityIds::new(isin, wkn),
                    })
                })
                .collect(),
        }
    }

    /// Custom watchlist. Duplicates are dropped, first occurrence wins; symbols
    /// missing from the reference table get placeholder ids.
    pub fn with_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut entries: Vec<WatchlistEntry> = Vec::new();
        for symbol in symbols {
            if entries.iter().any(|entry| entry.symbol == symbol) {
                continue;
            }
            let ids = lookup_ids(symbol.as_str());
            entries.push(WatchlistEntry { symbol, ids });
        }
        Self { entries }
    }

    /// Parses a comma-separated symbol list such as `AAPL, msft,BRK.B`.
    pub fn parse_list(raw: &str) -> Result<Self, ValidationError> {
        let symbols = raw
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Symbol::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if symbols.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        Ok(Self::with_symbols(symbols))
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter().map(|entry| &entry.symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// ISIN/WKN pair of a member, placeholder for anything else.
    pub fn ids_for(&self, symbol: &Symbol) -> SecurityIds {
        self.entries
            .iter()
            .find(|entry| &entry.symbol == symbol)
            .map(|entry| entry.ids)
            .unwrap_or(SecurityIds::PLACEHOLDER)
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::builtin()
    }
}
