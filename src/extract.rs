// 🔎 Field Extractors
// Stateless pattern matchers that pull amounts, ids and counterparties out of a message body.
//
// Every extractor takes the full body and returns `None` when its pattern does
// not match. Absence of a field is normal, never an error.

use regex::Regex;
use std::sync::OnceLock;

// ============================================================================
// PATTERNS
// ============================================================================

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:payment of|received|transferred|deposit of|transaction of|withdrawn|\*165\*S\*)\s*([\d,]+)\s*RWF",
        )
        .expect("invalid amount regex")
    })
}

fn balance_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)NEW BALANCE[:\s]*([\d,]+)\s*RWF").expect("invalid balance regex")
    })
}

fn txid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)TxId:\s*([0-9]+)").expect("invalid txid regex"))
}

fn financial_txid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Financial Transaction Id:\s*([0-9]+)")
            .expect("invalid financial transaction id regex")
    })
}

fn fee_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\bFee(?:\s*was)?\s*:?\s*([\d,]+)\s*RWF").expect("invalid fee regex")
    })
}

fn sender_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)from\s+([^(]+)[\s(]").expect("invalid sender regex"))
}

fn recipient_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:to|transferred to)\s+([A-Za-z]+\s[A-Za-z]+)[\s0-9]")
            .expect("invalid recipient regex")
    })
}

fn agent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)via agent:\s+([^(]+)").expect("invalid agent regex"))
}

fn business_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)transaction of[\s\d,]+RWF by\s+(.+?)\s*on your")
            .expect("invalid business regex")
    })
}

// ============================================================================
// HELPERS
// ============================================================================

/// Parse an RWF digit group, stripping thousands separators ("1,500" → 1500.0)
pub fn parse_rwf(digits: &str) -> Option<f64> {
    let cleaned: String = digits.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn capture<'a>(re: &Regex, body: &'a str) -> Option<&'a str> {
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn capture_trimmed(re: &Regex, body: &str) -> Option<String> {
    let text = capture(re, body)?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

// ============================================================================
// CATEGORY-INDEPENDENT FIELDS
// ============================================================================

pub fn extract_amount(body: &str) -> Option<f64> {
    capture(amount_re(), body).and_then(parse_rwf)
}

pub fn extract_balance(body: &str) -> Option<f64> {
    capture(balance_re(), body).and_then(parse_rwf)
}

/// Transaction identifier, kept verbatim as a digit string
///
/// `TxId:` is tried before `Financial Transaction Id:`.
pub fn extract_transaction_id(body: &str) -> Option<String> {
    capture(txid_re(), body)
        .or_else(|| capture(financial_txid_re(), body))
        .map(str::to_string)
}

pub fn extract_fee(body: &str) -> Option<f64> {
    capture(fee_re(), body).and_then(parse_rwf)
}

// ============================================================================
// COUNTERPARTIES
// ============================================================================

/// Text after "from" up to the next parenthesis
pub fn extract_sender(body: &str) -> Option<String> {
    capture_trimmed(sender_re(), body)
}

/// Two-word name after "to" / "transferred to"
///
/// Single-word and business recipients do not match.
pub fn extract_recipient(body: &str) -> Option<String> {
    capture_trimmed(recipient_re(), body)
}

pub fn extract_agent_name(body: &str) -> Option<String> {
    capture_trimmed(agent_re(), body)
}

/// Business between "transaction of <amount> RWF by" and "on your"
pub fn extract_business_name(body: &str) -> Option<String> {
    capture_trimmed(business_re(), body)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const INCOMING: &str = "You have received 2,000 RWF from Jane Doe (*************) on your mobile money account at 2024-05-10 16:30:51. Message from sender: . Your new balance:3,000 RWF. Financial Transaction Id: 76662021700.";
    const CODE_HOLDER: &str = "TxId: 73214484437. Your payment of 1,000 RWF to Jane Smith 12845 has been completed at 2024-05-10 16:31:39. Your new balance: 1,000 RWF. Fee was 0 RWF.Kanda*182*16# wiyandikishe muri poromosiyo ya BivaMoMotima, ugire amahirwe yo gutsindira ibihembo bishimishije.";
    const TRANSFER: &str = "*165*S*10,000 RWF transferred to Samuel Carter (250791666666) from 36521838 at 2024-05-11 20:34:47 . Fee was: 100 RWF. New balance: 28,300 RWF. Kugura ama inite cg interineti kuri MoMo, Kanda *182*2*1# .";
    const WITHDRAWAL: &str = "You Abebe Chala CHEBUDIE (*********036) have via agent: Agent Sophia (250790777777), withdrawn 20,000 RWF from your mobile money account: 36521838 at 2024-05-26 02:10:27 and you can now collect your money in cash. Your new balance: 6,400 RWF. Fee paid: 350 RWF. Message from agent: 1. Financial Transaction Id: 14098463509.";
    const THIRD_PARTY: &str = "*164*S*Y'ello,A transaction of 3,500 RWF by DIRECT PAYMENT LTD on your MOMO account was successfully completed at 2024-06-02 10:45:21. Message from debit receiver: . Your new balance:14,600 RWF. Fee was 0 RWF. Financial Transaction Id: 14483891522. External Transaction Id: 5ac79e46.";

    #[test]
    fn test_parse_rwf_strips_separators() {
        assert_eq!(parse_rwf("1,500"), Some(1500.0));
        assert_eq!(parse_rwf("1500"), Some(1500.0));
        assert_eq!(parse_rwf("1,234,567"), Some(1234567.0));
        assert_eq!(parse_rwf(","), None);
        assert_eq!(parse_rwf(""), None);
    }

    #[test]
    fn test_amount_is_separator_insensitive() {
        let with_sep = extract_amount("Your payment of 1,500 RWF to Airtime with token");
        let without_sep = extract_amount("Your payment of 1500 RWF to Airtime with token");
        assert_eq!(with_sep, Some(1500.0));
        assert_eq!(with_sep, without_sep);
    }

    #[test]
    fn test_amount_keywords() {
        assert_eq!(extract_amount(INCOMING), Some(2000.0));
        assert_eq!(extract_amount(CODE_HOLDER), Some(1000.0));
        assert_eq!(extract_amount(TRANSFER), Some(10000.0));
        assert_eq!(extract_amount(WITHDRAWAL), Some(20000.0));
        assert_eq!(extract_amount(THIRD_PARTY), Some(3500.0));
        assert_eq!(
            extract_amount("A bank deposit of 40,000 RWF has been added to your mobile money account"),
            Some(40000.0)
        );
    }

    #[test]
    fn test_amount_case_insensitive() {
        assert_eq!(extract_amount("PAYMENT OF 250 rwf"), Some(250.0));
    }

    #[test]
    fn test_amount_missing() {
        assert_eq!(extract_amount("Your account has been credited."), None);
        assert_eq!(extract_amount("You have received RWF"), None);
    }

    #[test]
    fn test_balance() {
        assert_eq!(extract_balance(INCOMING), Some(3000.0));
        assert_eq!(extract_balance(TRANSFER), Some(28300.0));
        assert_eq!(extract_balance("NEW BALANCE :  5,000RWF"), Some(5000.0));
        assert_eq!(extract_balance("no balance here"), None);
    }

    #[test]
    fn test_transaction_id_prefers_txid() {
        assert_eq!(extract_transaction_id(CODE_HOLDER), Some("73214484437".to_string()));
        assert_eq!(extract_transaction_id(INCOMING), Some("76662021700".to_string()));
        assert_eq!(
            extract_transaction_id("TxId: 111. Financial Transaction Id: 222."),
            Some("111".to_string())
        );
        assert_eq!(extract_transaction_id(TRANSFER), None);
    }

    #[test]
    fn test_transaction_id_keeps_leading_zeros() {
        assert_eq!(extract_transaction_id("TxId:00042"), Some("00042".to_string()));
    }

    #[test]
    fn test_fee() {
        assert_eq!(extract_fee(CODE_HOLDER), Some(0.0));
        assert_eq!(extract_fee(TRANSFER), Some(100.0));
        assert_eq!(extract_fee("Fee: 1,200 RWF"), Some(1200.0));
        assert_eq!(extract_fee(INCOMING), None);
    }

    #[test]
    fn test_sender() {
        assert_eq!(extract_sender(INCOMING), Some("Jane Doe".to_string()));
        assert_eq!(extract_sender("You have received 500 RWF on your mobile money account"), None);
    }

    #[test]
    fn test_recipient_two_word_name() {
        assert_eq!(extract_recipient(CODE_HOLDER), Some("Jane Smith".to_string()));
        assert_eq!(extract_recipient(TRANSFER), Some("Samuel Carter".to_string()));
    }

    #[test]
    fn test_recipient_single_word_does_not_match() {
        assert_eq!(
            extract_recipient("TxId: 1. Your payment of 1,000 RWF to Bakery 12845 has been completed"),
            None
        );
    }

    #[test]
    fn test_agent_name() {
        assert_eq!(extract_agent_name(WITHDRAWAL), Some("Agent Sophia".to_string()));
        assert_eq!(
            extract_agent_name("*** has via agent: John Agent (250788000000) withdrawn 5,000 RWF"),
            Some("John Agent".to_string())
        );
        assert_eq!(extract_agent_name(INCOMING), None);
    }

    #[test]
    fn test_business_name() {
        assert_eq!(
            extract_business_name(THIRD_PARTY),
            Some("DIRECT PAYMENT LTD".to_string())
        );
        assert_eq!(
            extract_business_name("A transaction of 900 RWF by MTN Online on your MOMO account"),
            Some("MTN Online".to_string())
        );
        assert_eq!(extract_business_name(INCOMING), None);
    }
}
