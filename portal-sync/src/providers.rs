/// A NiSource customer portal, one per operating company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    pub state_code: &'static str,
    pub name: &'static str,
    pub base_url: &'static str,
}

pub const PROVIDERS: &[Provider] = &[
    Provider {
        state_code: "OH",
        name: "Columbia Gas of Ohio",
        base_url: "https://myaccount.columbiagasohio.com",
    },
    Provider {
        state_code: "KY",
        name: "Columbia Gas of Kentucky",
        base_url: "https://myaccount.columbiagasofky.com",
    },
    Provider {
        state_code: "PA",
        name: "Columbia Gas of Pennsylvania",
        base_url: "https://myaccount.columbiagasofpa.com",
    },
    Provider {
        state_code: "MD",
        name: "Columbia Gas of Maryland",
        base_url: "https://myaccount.columbiagasofmd.com",
    },
    Provider {
        state_code: "VA",
        name: "Columbia Gas of Virginia",
        base_url: "https://myaccount.columbiagasofva.com",
    },
    Provider {
        state_code: "IN",
        name: "NIPSCO (Northern Indiana)",
        base_url: "https://myaccount.nipsco.com",
    },
];

pub fn by_state_code(code: &str) -> Option<&'static Provider> {
    let code = code.trim();
    PROVIDERS.iter().find(|p| p.state_code.eq_ignore_ascii_case(code))
}
