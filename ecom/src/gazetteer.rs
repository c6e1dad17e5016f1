use once_cell::sync::Lazy;
use std::sync::Arc;

/// One district: canonical Latin name and its Bengali spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GazetteerEntry {
    pub canonical: &'static str,
    pub variant: &'static str,
}

/// Fixed, ordered list of Bangladesh districts.
///
/// Order is part of the contract: fuzzy-match ties resolve to the earlier
/// entry, and the encoder emits one district slot per entry in this order.
#[derive(Debug)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
}

impl Gazetteer {
    pub fn new(entries: Vec<GazetteerEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&GazetteerEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn canonical_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.canonical)
    }

    /// Case-insensitive lookup by canonical name.
    pub fn find_canonical(&self, name: &str) -> Option<&GazetteerEntry> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|e| e.canonical.eq_ignore_ascii_case(name))
    }
}

const DISTRICTS: [(&str, &str); 64] = [
    ("Bagerhat", "বাগেরহাট"),
    ("Bandarban", "বান্দরবান"),
    ("Barguna", "বরগুনা"),
    ("Barisal", "বরিশাল"),
    ("Bhola", "ভোলা"),
    ("Bogra", "বগুড়া"),
    ("Brahmanbaria", "ব্রাহ্মণবাড়িয়া"),
    ("Chandpur", "চাঁদপুর"),
    ("Chapai Nawabganj", "চাঁপাইনবাবগঞ্জ"),
    ("Chattogram", "চট্টগ্রাম"),
    ("Chuadanga", "চুয়াডাঙ্গা"),
    ("Comilla", "কুমিল্লা"),
    ("Cox's Bazar", "কক্সবাজার"),
    ("Dhaka", "ঢাকা"),
    ("Dinajpur", "দিনাজপুর"),
    ("Faridpur", "ফরিদপুর"),
    ("Feni", "ফেনী"),
    ("Gaibandha", "গাইবান্ধা"),
    ("Gazipur", "গাজীপুর"),
    ("Gopalganj", "গোপালগঞ্জ"),
    ("Habiganj", "হবিগঞ্জ"),
    ("Jamalpur", "জামালপুর"),
    ("Jashore", "যশোর"),
    ("Jhalokathi", "ঝালকাঠি"),
    ("Jhenaidah", "ঝিনাইদহ"),
    ("Joypurhat", "জয়পুরহাট"),
    ("Khagrachhari", "খাগড়াছড়ি"),
    ("Khulna", "খুলনা"),
    ("Kishoreganj", "কিশোরগঞ্জ"),
    ("Kurigram", "কুড়িগ্রাম"),
    ("Kushtia", "কুষ্টিয়া"),
    ("Lakshmipur", "লক্ষ্মীপুর"),
    ("Lalmonirhat", "লালমনিরহাট"),
    ("Madaripur", "মাদারীপুর"),
    ("Magura", "মাগুরা"),
    ("Manikganj", "মানিকগঞ্জ"),
    ("Meherpur", "মেহেরপুর"),
    ("Moulvibazar", "মৌলভীবাজার"),
    ("Munshiganj", "মুন্সীগঞ্জ"),
    ("Mymensingh", "ময়মনসিংহ"),
    ("Naogaon", "নওগাঁ"),
    ("Narail", "নড়াইল"),
    ("Narayanganj", "নারায়ণগঞ্জ"),
    ("Narsingdi", "নরসিংদী"),
    ("Natore", "নাটোর"),
    ("Netrokona", "নেত্রকোনা"),
    ("Nilphamari", "নীলফামারী"),
    ("Noakhali", "নোয়াখালী"),
    ("Pabna", "পাবনা"),
    ("Panchagarh", "পঞ্চগড়"),
    ("Patuakhali", "পটুয়াখালী"),
    ("Pirojpur", "পিরোজপুর"),
    ("Rajbari", "রাজবাড়ী"),
    ("Rajshahi", "রাজশাহী"),
    ("Rangamati", "রাঙ্গামাটি"),
    ("Rangpur", "রংপুর"),
    ("Satkhira", "সাতক্ষীরা"),
    ("Shariatpur", "শরীয়তপুর"),
    ("Sherpur", "শেরপুর"),
    ("Sirajganj", "সিরাজগঞ্জ"),
    ("Sunamganj", "সুনামগঞ্জ"),
    ("Sylhet", "সিলেট"),
    ("Tangail", "টাঙ্গাইল"),
    ("Thakurgaon", "ঠাকুরগাঁও"),
];

/// Process-wide gazetteer shared by the district classifier and the encoder.
pub static BANGLADESH_DISTRICTS: Lazy<Arc<Gazetteer>> = Lazy::new(|| {
    Arc::new(Gazetteer::new(
        DISTRICTS
            .iter()
            .map(|&(canonical, variant)| GazetteerEntry { canonical, variant })
            .collect(),
    ))
});

pub fn bangladesh_districts() -> Arc<Gazetteer> {
    Arc::clone(&BANGLADESH_DISTRICTS)
}
