//! Order line items and the entry form

use std::fmt;
use std::str::FromStr;

/// How a line item was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    /// The product the entered code resolved to
    Main,
    /// A product bundled with the main item through a gift slot
    Gift,
    /// A line accepted without a catalog match
    Manual,
}

impl ItemKind {
    /// Upper-case tag used in listings
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Main => "MAIN",
            ItemKind::Gift => "GIFT",
            ItemKind::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order header fields shared by every line item added in one action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderHeader {
    /// 거래처명
    pub partner: String,
    /// 주문인
    pub orderer: String,
    /// 수취인
    pub recipient: String,
    /// 전화번호
    pub phone: String,
    /// 핸드폰
    pub mobile: String,
    /// 주소
    pub address: String,
    /// 수량
    pub quantity: String,
    /// 수수료
    pub fee: String,
    /// 배송비
    pub shipping_fee: String,
    /// 배송메모
    pub memo: String,
}

/// One row of the order list
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderLineItem {
    pub kind: ItemKind,
    pub product_name: String,
    pub product_code: String,
    pub header: OrderHeader,
}

impl OrderLineItem {
    /// Create an item with an empty header
    pub fn new(
        kind: ItemKind,
        product_name: impl Into<String>,
        product_code: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            product_name: product_name.into(),
            product_code: product_code.into(),
            header: OrderHeader::default(),
        }
    }

    /// Replace the header
    pub fn with_header(mut self, header: OrderHeader) -> Self {
        self.header = header;
        self
    }
}

/// Fields of the entry form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Partner,
    Orderer,
    Recipient,
    Phone,
    Mobile,
    Address,
    Barcode,
    Quantity,
    Fee,
    ShippingFee,
    Memo,
}

impl FormField {
    /// All fields in form order
    pub const ALL: [FormField; 11] = [
        FormField::Partner,
        FormField::Orderer,
        FormField::Recipient,
        FormField::Phone,
        FormField::Mobile,
        FormField::Address,
        FormField::Barcode,
        FormField::Quantity,
        FormField::Fee,
        FormField::ShippingFee,
        FormField::Memo,
    ];

    /// Machine name
    pub fn key(&self) -> &'static str {
        match self {
            FormField::Partner => "partner",
            FormField::Orderer => "orderer",
            FormField::Recipient => "recipient",
            FormField::Phone => "phone",
            FormField::Mobile => "mobile",
            FormField::Address => "address",
            FormField::Barcode => "barcode",
            FormField::Quantity => "quantity",
            FormField::Fee => "fee",
            FormField::ShippingFee => "shipping_fee",
            FormField::Memo => "memo",
        }
    }

    /// Label shown to the clerk
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Partner => "거래처명",
            FormField::Orderer => "주문인",
            FormField::Recipient => "수취인",
            FormField::Phone => "전화번호",
            FormField::Mobile => "핸드폰",
            FormField::Address => "주소",
            FormField::Barcode => "바코드",
            FormField::Quantity => "수량",
            FormField::Fee => "수수료",
            FormField::ShippingFee => "배송비",
            FormField::Memo => "배송메모",
        }
    }
}

impl FromStr for FormField {
    type Err = String;

    /// Accepts either the machine name or the Korean label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        FormField::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(s) || f.label() == s)
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

/// State of the entry form: the shared header plus the product code being entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
    pub header: OrderHeader,
    pub barcode: String,
}

impl OrderForm {
    /// Get a field value
    pub fn get(&self, field: FormField) -> &str {
        let h = &self.header;
        match field {
            FormField::Partner => &h.partner,
            FormField::Orderer => &h.orderer,
            FormField::Recipient => &h.recipient,
            FormField::Phone => &h.phone,
            FormField::Mobile => &h.mobile,
            FormField::Address => &h.address,
            FormField::Barcode => &self.barcode,
            FormField::Quantity => &h.quantity,
            FormField::Fee => &h.fee,
            FormField::ShippingFee => &h.shipping_fee,
            FormField::Memo => &h.memo,
        }
    }

    /// Set a field value
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        let h = &mut self.header;
        match field {
            FormField::Partner => h.partner = value,
            FormField::Orderer => h.orderer = value,
            FormField::Recipient => h.recipient = value,
            FormField::Phone => h.phone = value,
            FormField::Mobile => h.mobile = value,
            FormField::Address => h.address = value,
            FormField::Barcode => self.barcode = value,
            FormField::Quantity => h.quantity = value,
            FormField::Fee => h.fee = value,
            FormField::ShippingFee => h.shipping_fee = value,
            FormField::Memo => h.memo = value,
        }
    }

    /// Clear the per-line fields after a successful add.
    ///
    /// Partner, orderer and the delivery details usually repeat across lines
    /// and are kept.
    pub fn clear_line_fields(&mut self) {
        self.barcode.clear();
        self.header.quantity.clear();
        self.header.memo.clear();
    }
}
