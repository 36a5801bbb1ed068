mod learn_and_retrieve;
