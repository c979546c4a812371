//! Static reference data shared by the pattern generators.
//!
//! The agent table and the standard address pool are literal data: fixtures
//! built from them are compared byte-for-byte by downstream tests, so both
//! order and content are fixed.

/// Client addresses in pool order. Generators select by fixed index.
pub const STANDARD_ADDRESSES: [&str; 23] = [
    "100.43.83.155",
    "107.20.105.156",
    "108.178.58.134",
    "108.61.95.199",
    "109.206.179.190",
    "113.212.70.155",
    "118.210.119.98",
    "119.63.193.131",
    "119.63.193.132",
    "119.63.193.194",
    "119.63.193.195",
    "119.63.193.196",
    "122.162.24.97",
    "150.70.172.103",
    "150.70.172.108",
    "150.70.75.29",
    "157.55.32.102",
    "157.55.32.105",
    "157.55.32.94",
    "157.55.33.50",
    "157.55.33.83",
    "157.55.34.25",
    "157.55.36.39",
];

/// User-agent categories, one per row of the agent table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentCategory {
    Phone,
    Mobile,
    Tablet,
    Browser,
    Desktop,
    Download,
    Checker,
    Bot,
    Unwanted,
    Unclassified,
    None,
    Proxy,
    Unknown,
}

impl AgentCategory {
    /// All categories in table order.
    pub fn all() -> &'static [AgentCategory] {
        &[
            AgentCategory::Phone,
            AgentCategory::Mobile,
            AgentCategory::Tablet,
            AgentCategory::Browser,
            AgentCategory::Desktop,
            AgentCategory::Download,
            AgentCategory::Checker,
            AgentCategory::Bot,
            AgentCategory::Unwanted,
            AgentCategory::Unclassified,
            AgentCategory::None,
            AgentCategory::Proxy,
            AgentCategory::Unknown,
        ]
    }

    /// Category label, also used as the request path (`/<label>`).
    pub fn label(&self) -> &'static str {
        match self {
            AgentCategory::Phone => "phone",
            AgentCategory::Mobile => "mobile",
            AgentCategory::Tablet => "tablet",
            AgentCategory::Browser => "browser",
            AgentCategory::Desktop => "desktop",
            AgentCategory::Download => "download",
            AgentCategory::Checker => "checker",
            AgentCategory::Bot => "bot",
            AgentCategory::Unwanted => "unwanted",
            AgentCategory::Unclassified => "unclassified",
            AgentCategory::None => "none",
            AgentCategory::Proxy => "proxy",
            AgentCategory::Unknown => "unknown",
        }
    }

    /// The literal user-agent string for this category.
    pub fn user_agent(&self) -> &'static str {
        match self {
            AgentCategory::Phone => "Mozilla/5.0 (iPhone; CPU iPhone OS 5_0_1 like Mac OS X) AppleWebKit/534.46 (KHTML, like Gecko) Version/5.1 Mobile/9A405 Safari/7534.48.3",
            AgentCategory::Mobile => "Opera/9.80 (J2ME/MIDP; Opera Mini/4.3.24214/28.2555; U; en) Presto/2.8.119 Version/11.10",
            AgentCategory::Tablet => "Mozilla/5.0 (iPad; CPU OS 6_1_2 like Mac OS X) AppleWebKit/536.26 (KHTML, like Gecko) Version/6.0 Mobile/10B147 Safari/8536.25",
            AgentCategory::Browser => "Mozilla/4.0 (compatible; MSIE 7.0; Windows NT 5.1; bgft)",
            AgentCategory::Desktop => "Mozilla/5.0 (Windows; U; Windows NT 6.1; en-US; rv:0.9.4.1) Gecko/20020508 Netscape6/6.2.3",
            AgentCategory::Download => "Wget/1.x+cvs-stable (Red Hat modified)",
            AgentCategory::Checker => "Jigsaw/2.2.x W3C_CSS_Validator_JFouffa/2.0",
            AgentCategory::Bot => "Googlebot/2.1 (+http://www.google.com/bot.html)",
            AgentCategory::Unwanted => "ZmEu",
            AgentCategory::Unclassified => "LotusDiscovery/x.0 (compatible; Mozilla 4.0; MSIE 4.01; Windows NT)",
            AgentCategory::None => "-",
            AgentCategory::Proxy => "MIIxpc/4.2",
            AgentCategory::Unknown => "WTF/1.0 (compatible; test user-agent)",
        }
    }

    /// Request path for per-category records.
    pub fn path(&self) -> String {
        format!("/{}", self.label())
    }
}

impl std::fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An ordered, non-empty sequence of client addresses.
#[derive(Debug, Clone, Copy)]
pub struct AddressPool<'a> {
    addresses: &'a [&'a str],
}

impl<'a> AddressPool<'a> {
    /// Wrap a list of addresses. Returns `None` for an empty list.
    pub fn new(addresses: &'a [&'a str]) -> Option<Self> {
        if addresses.is_empty() {
            None
        } else {
            Some(Self { addresses })
        }
    }

    /// Number of addresses in the pool.
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Whether the pool is empty (never true for a constructed pool).
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Address at `index`, wrapping past the end of the pool.
    pub fn get(&self, index: usize) -> &'a str {
        self.addresses[index % self.addresses.len()]
    }
}

impl AddressPool<'static> {
    /// The 23-address pool every shipped fixture uses.
    pub fn standard() -> Self {
        Self {
            addresses: &STANDARD_ADDRESSES,
        }
    }
}

impl Default for AddressPool<'static> {
    fn default() -> Self {
        Self::standard()
    }
}
